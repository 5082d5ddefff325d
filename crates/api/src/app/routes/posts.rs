//! Post and comment routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use atrium_core::{CategoryId, PostId};
use atrium_forum::NewPostInput;

use crate::app::{dto, errors, services::AppServices};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_post))
        .route("/:id/comments", get(list_comments).post(add_comment))
        .route("/:id/typing", post(typing))
}

/// GET /home - categories plus posts with author/category/comment-count
/// aggregates
pub async fn home(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    match services.forum.home(actor.actor()).await {
        Ok(view) => (StatusCode::OK, Json(dto::home_to_json(&view))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /posts - create a post
pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreatePostRequest>,
) -> axum::response::Response {
    let category_id: CategoryId = match body.category_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id");
        }
    };

    let input = NewPostInput {
        category_id,
        title: body.title,
        description: body.description,
    };

    match services.forum.create_post(actor.actor(), input).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::post_to_json(&created))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /posts/:id/comments - list a post's comment thread
pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let post_id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid post id"),
    };

    match services.forum.comments(actor.actor(), post_id).await {
        Ok(comments) => {
            let items: Vec<_> = comments.iter().map(dto::comment_with_author_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /posts/:id/comments - add a comment and fan it out
pub async fn add_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddCommentRequest>,
) -> axum::response::Response {
    let post_id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid post id"),
    };

    match services.forum.add_comment(actor.actor(), post_id, &body.content).await {
        Ok(comment) => (StatusCode::CREATED, Json(dto::comment_to_json(&comment))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /posts/:id/typing - signal that the actor is composing a comment
pub async fn typing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let post_id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid post id"),
    };

    match services.forum.typing(actor.actor(), post_id).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
