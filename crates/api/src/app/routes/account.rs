//! Self-service account routes (identity-gated).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use atrium_auth::PasswordChange;
use atrium_core::EmailAddress;

use crate::app::{dto, errors, services::AppServices};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/profile/:email", get(profile))
        .route("/password", post(change_password))
}

/// GET /account/profile/:email - the signed-in user's own profile
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(email): Path<String>,
) -> axum::response::Response {
    let email = match EmailAddress::parse(&email) {
        Ok(e) => e,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", "invalid email");
        }
    };

    match services.accounts.profile(actor.actor(), &email).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /account/password - change the signed-in user's password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    let email = match EmailAddress::parse(&body.email) {
        Ok(e) => e,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", "invalid email");
        }
    };

    let attempt = PasswordChange {
        current: &body.current_password,
        new: &body.new_password,
        confirm: &body.confirm_password,
    };

    match services.accounts.change_password(actor.actor(), &email, attempt).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
