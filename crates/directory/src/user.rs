//! Directory entities: users and roles.

use chrono::{DateTime, Utc};

use atrium_auth::Actor;
use atrium_core::{EmailAddress, RoleId, UserId};

/// A role in the single numeric ordering.
///
/// Higher `permission_level` means more privileged. The services only ever
/// read levels; defining roles is an operator concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub role_id: RoleId,
    pub name: String,
    pub permission_level: i32,
}

/// A user as the directory resolves it.
///
/// `permission_level` is denormalized from the user's role at lookup time.
/// `deactivated_at` is the soft-delete marker: set on deactivation, nulled
/// on reactivation; the row itself is never removed, so a deactivated user
/// stays resolvable as an administrative target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub display_name: String,
    pub role_id: RoleId,
    pub permission_level: i32,
    pub deactivated_at: Option<DateTime<Utc>>,
    /// One-way digest. Kept off every API response by the DTO layer.
    pub password_hash: String,
}

impl DirectoryUser {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// The per-request actor view of this user.
    pub fn as_actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            email: self.email.clone(),
            permission_level: self.permission_level,
            role_id: self.role_id,
            active: self.is_active(),
        }
    }
}

/// Insertion payload for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub display_name: String,
    pub role_id: RoleId,
    pub password_hash: String,
}
