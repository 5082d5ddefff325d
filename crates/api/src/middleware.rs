use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use atrium_auth::SessionCodec;
use atrium_directory::DirectoryStore;

use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionCodec>,
    pub directory: Arc<dyn DirectoryStore>,
}

/// Resolve the session and the actor for every protected route.
///
/// A missing/invalid token and an unknown or deactivated account are the
/// same outcome from the caller's perspective: 401. Actor resolution is
/// active-only — a deactivated user's token may still be structurally
/// valid, but it no longer authenticates.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let identity = state
        .sessions
        .resolve(token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user = state
        .directory
        .find_active_by_email(&identity.email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "actor lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(ActorContext::new(user.as_actor()));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
