//! Minimum permission levels per operation kind.

/// Process-wide permission thresholds.
///
/// Constructed once at startup and passed explicitly into every rule call;
/// the rules never read ambient global state, so tests can override any
/// threshold deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionThresholds {
    /// Minimum level to view the forum home and add comments.
    pub view_home: i32,
    /// Minimum level to create posts and categories.
    pub create_post: i32,
    /// Minimum level for user administration.
    pub manage_users: i32,
}

impl Default for PermissionThresholds {
    fn default() -> Self {
        Self {
            view_home: 10,
            create_post: 40,
            manage_users: 80,
        }
    }
}

impl PermissionThresholds {
    /// Read overrides from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            view_home: env_level("ATRIUM_THRESHOLD_VIEW_HOME", defaults.view_home),
            create_post: env_level("ATRIUM_THRESHOLD_CREATE_POST", defaults.create_post),
            manage_users: env_level("ATRIUM_THRESHOLD_MANAGE_USERS", defaults.manage_users),
        }
    }
}

fn env_level(key: &str, fallback: i32) -> i32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}
