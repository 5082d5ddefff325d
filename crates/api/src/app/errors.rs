use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use atrium_auth::ServiceError;

/// Map a service error onto the HTTP taxonomy.
///
/// The `Unexpected` cause is logged here with context and never echoed to
/// the caller.
pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    if let ServiceError::Unexpected(cause) = &err {
        tracing::error!(error = ?cause, "request failed unexpectedly");
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_error(status, err.code(), err.user_message())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
