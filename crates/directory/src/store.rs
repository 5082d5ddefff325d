//! Store contracts consumed by the directory services.
//!
//! Actor resolution and administrative target resolution are two distinct
//! capabilities over the same rows: [`DirectoryStore::find_active_by_email`]
//! excludes soft-deleted users, [`DirectoryStore::find_any_by_email`] does
//! not. Keeping them as separate methods makes the asymmetry visible at
//! every call site instead of hiding it behind a boolean flag.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use atrium_core::{EmailAddress, RoleId, UserId};

use crate::user::{DirectoryUser, NewUser, Role};

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Resolve an email to an active user. Deactivated users are invisible
    /// here: a stale session must never authenticate one.
    async fn find_active_by_email(
        &self,
        email: &EmailAddress,
    ) -> anyhow::Result<Option<DirectoryUser>>;

    /// Resolve an email regardless of activation state, for administrative
    /// operations that need to see deactivated accounts (e.g. reactivation).
    async fn find_any_by_email(
        &self,
        email: &EmailAddress,
    ) -> anyhow::Result<Option<DirectoryUser>>;

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<DirectoryUser>;

    /// Soft-delete toggle: `Some(ts)` deactivates, `None` reactivates.
    async fn set_deactivated_at(
        &self,
        email: &EmailAddress,
        at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()>;

    async fn update_role(&self, user_id: UserId, role_id: RoleId) -> anyhow::Result<()>;

    async fn update_password_hash(&self, email: &EmailAddress, hash: &str) -> anyhow::Result<()>;

    /// All users, deactivated ones included (administrative listing).
    async fn list_users(&self) -> anyhow::Result<Vec<DirectoryUser>>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role(&self, role_id: RoleId) -> anyhow::Result<Option<Role>>;

    async fn list_roles(&self) -> anyhow::Result<Vec<Role>>;

    async fn insert_role(&self, role: Role) -> anyhow::Result<()>;
}
