//! HTTP API application wiring (axum router + service wiring).
//!
//! Structure:
//! - `services.rs`: store/provider wiring and startup seeding
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Router {
    let services = Arc::new(services::build_services(config).await);

    let auth_state = middleware::AuthState {
        sessions: services.sessions.clone(),
        directory: services.directory.clone(),
    };

    // Protected routes: require a session and a resolvable active actor.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        // The SSE subscription authenticates via the subscribe-scoped
        // client token, the way a hosted provider authenticates its
        // client connections.
        .route("/realtime/posts/:id/stream", get(routes::realtime::subscribe))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
