//! Session issuance.

use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use atrium_auth::ServiceError;
use atrium_core::EmailAddress;

use crate::app::{dto, errors, services::AppServices};

/// POST /auth/login - verify credentials and issue a session token
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let email = match EmailAddress::parse(&body.email) {
        Ok(e) => e,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", "invalid email");
        }
    };

    let user = match services.accounts.authenticate(&email, &body.password).await {
        Ok(user) => user,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.sessions.issue(&user.email, Utc::now()) {
        Ok(token) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "token": token,
                "user": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(ServiceError::Unexpected(e)),
    }
}
