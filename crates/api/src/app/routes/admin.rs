//! Administrative routes for the user directory.
//!
//! Every handler hands the actor to the directory executors; the rule
//! engine inside them enforces the manage-users gate and the strict
//! level-dominance checks.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use atrium_core::{EmailAddress, RoleId};
use atrium_directory::CreateUser;

use crate::app::{dto, errors, services::AppServices};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/role", post(change_role))
        .route("/users/:email/deactivate", post(deactivate_user))
        .route("/users/:email/activate", post(activate_user))
        .route("/roles", get(list_roles))
}

/// GET /admin/users - list all users, deactivated ones included
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    match services.admin.list_users(actor.actor()).await {
        Ok(users) => {
            let items: Vec<_> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /admin/roles - the role ladder, for the change-role UI
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    match services.admin.list_roles(actor.actor()).await {
        Ok(roles) => {
            let items: Vec<_> = roles.iter().map(dto::role_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /admin/users - create a user
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let email = match EmailAddress::parse(&body.email) {
        Ok(e) => e,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", "invalid email");
        }
    };
    let role_id: RoleId = match body.role_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id"),
    };

    let input = CreateUser {
        email,
        display_name: body.display_name,
        role_id,
        password: body.password,
    };

    match services.admin.create_user(actor.actor(), input).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /admin/users/role - move a user to another role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::ChangeRoleRequest>,
) -> axum::response::Response {
    let email = match EmailAddress::parse(&body.email) {
        Ok(e) => e,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", "invalid email");
        }
    };
    let role_id: RoleId = match body.role_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id"),
    };

    match services.admin.change_role(actor.actor(), &email, role_id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /admin/users/:email/deactivate - soft-delete (idempotent)
pub async fn deactivate_user(
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

    match services.admin.deactivate(actor.actor(), &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /admin/users/:email/activate - undo a soft-delete (idempotent)
pub async fn activate_user(
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

    match services.admin.activate(actor.actor(), &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
