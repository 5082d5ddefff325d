//! Mutation executors for user administration and self-service accounts.
//!
//! Every operation resolves the rule engine before touching the store for
//! writes: on a deny, no store mutation has been performed. Reads needed to
//! feed the rules (target and role lookups) are allowed to precede the gate.

use std::sync::Arc;

use chrono::Utc;

use atrium_auth::{Actor, PasswordChange, PasswordHasher, PermissionThresholds, ServiceError, rules};
use atrium_core::{EmailAddress, RoleId, UserId};

use crate::store::{DirectoryStore, RoleStore};
use crate::user::{DirectoryUser, NewUser, Role};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: EmailAddress,
    pub display_name: String,
    pub role_id: RoleId,
    pub password: String,
}

/// Administrative operations on the user directory.
#[derive(Clone)]
pub struct UserAdminService {
    directory: Arc<dyn DirectoryStore>,
    roles: Arc<dyn RoleStore>,
    hasher: Arc<dyn PasswordHasher>,
    thresholds: PermissionThresholds,
}

impl UserAdminService {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        roles: Arc<dyn RoleStore>,
        hasher: Arc<dyn PasswordHasher>,
        thresholds: PermissionThresholds,
    ) -> Self {
        Self {
            directory,
            roles,
            hasher,
            thresholds,
        }
    }

    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<DirectoryUser>, ServiceError> {
        rules::can_manage_users(&self.thresholds, actor)?;
        Ok(self.directory.list_users().await?)
    }

    pub async fn list_roles(&self, actor: &Actor) -> Result<Vec<Role>, ServiceError> {
        rules::can_manage_users(&self.thresholds, actor)?;
        Ok(self.roles.list_roles().await?)
    }

    pub async fn create_user(
        &self,
        actor: &Actor,
        input: CreateUser,
    ) -> Result<DirectoryUser, ServiceError> {
        rules::can_manage_users(&self.thresholds, actor)?;

        let role = self
            .roles
            .find_role(input.role_id)
            .await?
            .ok_or_else(|| ServiceError::invalid_input("unknown role"))?;

        rules::can_create_user(&self.thresholds, actor, role.permission_level)?;

        if input.display_name.trim().is_empty() {
            return Err(ServiceError::invalid_input("display name cannot be empty"));
        }
        if input.password.is_empty() {
            return Err(ServiceError::invalid_input("password cannot be empty"));
        }

        // Check-then-insert; the race with a concurrent registration of the
        // same email is accepted and left to the store's unique index.
        if self.directory.find_any_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::conflict("email is already registered"));
        }

        let hash = self.hasher.hash(&input.password)?;
        let user = self
            .directory
            .insert_user(NewUser {
                user_id: UserId::new(),
                email: input.email,
                display_name: input.display_name.trim().to_string(),
                role_id: role.role_id,
                password_hash: hash,
            })
            .await?;

        tracing::info!(user = %user.email, role = %role.name, "user created");
        Ok(user)
    }

    pub async fn change_role(
        &self,
        actor: &Actor,
        target_email: &EmailAddress,
        new_role_id: RoleId,
    ) -> Result<DirectoryUser, ServiceError> {
        rules::can_manage_users(&self.thresholds, actor)?;

        let target = self
            .directory
            .find_any_by_email(target_email)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let role = self
            .roles
            .find_role(new_role_id)
            .await?
            .ok_or_else(|| ServiceError::invalid_input("unknown role"))?;

        rules::can_change_role(
            &self.thresholds,
            actor,
            target.permission_level,
            role.permission_level,
        )?;

        self.directory.update_role(target.user_id, role.role_id).await?;
        tracing::info!(user = %target.email, role = %role.name, "role changed");

        Ok(DirectoryUser {
            role_id: role.role_id,
            permission_level: role.permission_level,
            ..target
        })
    }

    /// Idempotent: a missing or already-deactivated target is a no-op, not
    /// an error.
    pub async fn deactivate(
        &self,
        actor: &Actor,
        email: &EmailAddress,
    ) -> Result<(), ServiceError> {
        let target = self.directory.find_any_by_email(email).await?;
        rules::can_deactivate(
            &self.thresholds,
            actor,
            target.as_ref().map(|t| t.permission_level),
        )?;

        match target {
            Some(t) if t.is_active() => {
                self.directory
                    .set_deactivated_at(email, Some(Utc::now()))
                    .await?;
                tracing::info!(user = %email, "user deactivated");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Idempotent: a missing or already-active target is a no-op, not an
    /// error.
    pub async fn activate(&self, actor: &Actor, email: &EmailAddress) -> Result<(), ServiceError> {
        let target = self.directory.find_any_by_email(email).await?;
        rules::can_activate(
            &self.thresholds,
            actor,
            target.as_ref().map(|t| t.permission_level),
        )?;

        match target {
            Some(t) if !t.is_active() => {
                self.directory.set_deactivated_at(email, None).await?;
                tracing::info!(user = %email, "user reactivated");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Self-service account operations (identity-gated, not privilege-gated).
#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn DirectoryStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    pub fn new(directory: Arc<dyn DirectoryStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { directory, hasher }
    }

    /// Verify credentials for session issuance. Deactivated users never
    /// authenticate: the lookup is active-only.
    pub async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<DirectoryUser, ServiceError> {
        let user = self
            .directory
            .find_active_by_email(email)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(ServiceError::Unauthenticated);
        }

        Ok(user)
    }

    /// View the signed-in user's own profile. Cross-user access denies
    /// regardless of permission level.
    pub async fn profile(
        &self,
        actor: &Actor,
        email: &EmailAddress,
    ) -> Result<DirectoryUser, ServiceError> {
        rules::self_access(actor, email)?;

        self.directory
            .find_active_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn change_password(
        &self,
        actor: &Actor,
        email: &EmailAddress,
        attempt: PasswordChange<'_>,
    ) -> Result<(), ServiceError> {
        // Deny cross-user attempts before the directory read; the password
        // rule re-checks self-access as part of its own contract.
        rules::self_access(actor, email)?;

        let user = self
            .directory
            .find_active_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound)?;

        rules::can_change_password(
            actor,
            email,
            &user.password_hash,
            &attempt,
            self.hasher.as_ref(),
        )?;

        let hash = self.hasher.hash(attempt.new)?;
        self.directory.update_password_hash(email, &hash).await?;
        tracing::info!(user = %email, "password changed");
        Ok(())
    }
}
