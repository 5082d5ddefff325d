//! Category routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::{dto, errors, services::AppServices};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_categories).post(create_category))
}

/// GET /categories - list categories
pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    match services.forum.list_categories(actor.actor()).await {
        Ok(categories) => {
            let items: Vec<_> = categories.iter().map(dto::category_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /categories - create a category (name must be unique)
pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    match services.forum.create_category(actor.actor(), &body.name).await {
        Ok(category) => {
            (StatusCode::CREATED, Json(dto::category_to_json(&category))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
