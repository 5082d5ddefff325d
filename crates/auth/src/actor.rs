use atrium_core::{EmailAddress, RoleId, UserId};

/// A fully resolved actor for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API layer builds it per request from a resolved session
/// identity plus a directory lookup. It is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub permission_level: i32,
    pub role_id: RoleId,
    pub active: bool,
}

/// Authenticated identity produced by the session resolver.
///
/// Deliberately thin: the session proves *who* is calling; the directory
/// decides what that identity currently maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: EmailAddress,
}
