//! Environment-backed configuration, read once at startup.

use chrono::Duration;

pub struct ApiConfig {
    pub bind_addr: String,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub client_token_ttl: Duration,
    pub use_persistent: bool,
    pub database_url: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(86_400);

        Self {
            bind_addr: std::env::var("ATRIUM_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            session_secret,
            session_ttl: Duration::seconds(session_ttl_secs),
            client_token_ttl: Duration::hours(1),
            use_persistent: std::env::var("USE_PERSISTENT_STORES")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .unwrap_or(false),
            database_url: std::env::var("DATABASE_URL").ok(),
            admin_email: std::env::var("ATRIUM_ADMIN_EMAIL").ok(),
            admin_password: std::env::var("ATRIUM_ADMIN_PASSWORD").ok(),
        }
    }
}
