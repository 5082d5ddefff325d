use axum::http::StatusCode;

/// GET /health - liveness probe
pub async fn health() -> StatusCode {
    StatusCode::OK
}
