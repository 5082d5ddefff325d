use axum::{Router, routing::get};

pub mod account;
pub mod admin;
pub mod auth;
pub mod categories;
pub mod posts;
pub mod realtime;
pub mod system;

/// Protected routes (session + actor context required).
pub fn router() -> Router {
    Router::new()
        .route("/home", get(posts::home))
        .nest("/posts", posts::router())
        .nest("/categories", categories::router())
        .nest("/account", account::router())
        .nest("/admin", admin::router())
        .nest("/realtime", realtime::router())
}
