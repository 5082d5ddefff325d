//! Permission rule engine.
//!
//! One pure decision function per operation kind. Every function takes the
//! actor (plus any targets) and returns `Ok(())` or a typed [`AccessDenied`].
//!
//! - No IO
//! - No panics
//! - Threshold gates compare with `>=`; peer comparisons are strict `<`/`>`.
//!   The asymmetry is load-bearing: a peer-level target or role must deny,
//!   otherwise two accounts at the same level could act on each other.

use thiserror::Error;

use atrium_core::EmailAddress;

use crate::{Actor, PasswordHasher, PermissionThresholds};

/// Why an operation was denied.
///
/// Every variant is machine-distinguishable; the `Display` text is the
/// user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("insufficient permission")]
    InsufficientPermission,

    #[error("target user is not below your permission level")]
    TargetNotBelow,

    #[error("requested role is not below your permission level")]
    RoleNotBelow,

    #[error("account access is limited to the signed-in user")]
    NotSelf,

    #[error("current password is incorrect")]
    WrongCurrentPassword,

    #[error("password confirmation does not match")]
    ConfirmationMismatch,

    #[error("new password must differ from the current password")]
    PasswordUnchanged,
}

/// Password change attempt as submitted by the caller.
#[derive(Debug, Clone, Copy)]
pub struct PasswordChange<'a> {
    pub current: &'a str,
    pub new: &'a str,
    pub confirm: &'a str,
}

pub fn can_view_home(th: &PermissionThresholds, actor: &Actor) -> Result<(), AccessDenied> {
    require_level(actor, th.view_home)
}

/// Commenting shares the home threshold: anyone who can read a thread can
/// reply to it.
pub fn can_add_comment(th: &PermissionThresholds, actor: &Actor) -> Result<(), AccessDenied> {
    require_level(actor, th.view_home)
}

pub fn can_create_post(th: &PermissionThresholds, actor: &Actor) -> Result<(), AccessDenied> {
    require_level(actor, th.create_post)
}

/// Gates the permission dimension only; category-name uniqueness is a store
/// round-trip owned by the executor.
pub fn can_create_category(th: &PermissionThresholds, actor: &Actor) -> Result<(), AccessDenied> {
    require_level(actor, th.create_post)
}

pub fn can_manage_users(th: &PermissionThresholds, actor: &Actor) -> Result<(), AccessDenied> {
    require_level(actor, th.manage_users)
}

/// Role changes require strict dominance over both the target user and the
/// requested role: an actor can never elevate a target to, nor act upon a
/// target already at, a level equal to or exceeding their own.
pub fn can_change_role(
    th: &PermissionThresholds,
    actor: &Actor,
    target_level: i32,
    new_role_level: i32,
) -> Result<(), AccessDenied> {
    can_manage_users(th, actor)?;
    if target_level >= actor.permission_level {
        return Err(AccessDenied::TargetNotBelow);
    }
    if new_role_level >= actor.permission_level {
        return Err(AccessDenied::RoleNotBelow);
    }
    Ok(())
}

/// `target_level` is `None` when no directory row exists for the email.
/// The absent-target branch lets the call through as a no-op candidate
/// rather than failing hard; the executor turns it into a no-op. Preserved
/// observed behavior, see DESIGN.md.
pub fn can_deactivate(
    th: &PermissionThresholds,
    actor: &Actor,
    target_level: Option<i32>,
) -> Result<(), AccessDenied> {
    can_act_on_account(th, actor, target_level)
}

/// Same rule as [`can_deactivate`]: activation of an email with no
/// directory row at all also passes the gate.
pub fn can_activate(
    th: &PermissionThresholds,
    actor: &Actor,
    target_level: Option<i32>,
) -> Result<(), AccessDenied> {
    can_act_on_account(th, actor, target_level)
}

fn can_act_on_account(
    th: &PermissionThresholds,
    actor: &Actor,
    target_level: Option<i32>,
) -> Result<(), AccessDenied> {
    can_manage_users(th, actor)?;
    if let Some(level) = target_level {
        if level >= actor.permission_level {
            return Err(AccessDenied::TargetNotBelow);
        }
    }
    Ok(())
}

/// Identity check, not a privilege check: always denies cross-user access,
/// and always allows the actor's own email regardless of permission level.
pub fn self_access(actor: &Actor, requested: &EmailAddress) -> Result<(), AccessDenied> {
    if &actor.email == requested {
        Ok(())
    } else {
        Err(AccessDenied::NotSelf)
    }
}

/// Each failure is a distinct deny so callers can surface distinct
/// user-facing messages (wrong old password vs. mismatch vs. no-op change).
pub fn can_change_password(
    actor: &Actor,
    target_email: &EmailAddress,
    stored_hash: &str,
    attempt: &PasswordChange<'_>,
    hasher: &dyn PasswordHasher,
) -> Result<(), AccessDenied> {
    self_access(actor, target_email)?;
    if !hasher.verify(attempt.current, stored_hash) {
        return Err(AccessDenied::WrongCurrentPassword);
    }
    if attempt.new != attempt.confirm {
        return Err(AccessDenied::ConfirmationMismatch);
    }
    if attempt.new == attempt.current {
        return Err(AccessDenied::PasswordUnchanged);
    }
    Ok(())
}

/// Creation is stricter than the threshold gate alone: the proposed role
/// must sit strictly below the actor, so not even a peer-level account can
/// be minted.
pub fn can_create_user(
    th: &PermissionThresholds,
    actor: &Actor,
    proposed_role_level: i32,
) -> Result<(), AccessDenied> {
    can_manage_users(th, actor)?;
    if proposed_role_level >= actor.permission_level {
        return Err(AccessDenied::RoleNotBelow);
    }
    Ok(())
}

fn require_level(actor: &Actor, minimum: i32) -> Result<(), AccessDenied> {
    if actor.permission_level >= minimum {
        Ok(())
    } else {
        Err(AccessDenied::InsufficientPermission)
    }
}

#[cfg(test)]
mod tests {
    use atrium_core::{RoleId, UserId};
    use proptest::prelude::*;

    use super::*;

    fn actor(level: i32) -> Actor {
        Actor {
            user_id: UserId::new(),
            email: EmailAddress::parse("actor@example.com").unwrap(),
            permission_level: level,
            role_id: RoleId::new(),
            active: true,
        }
    }

    fn thresholds() -> PermissionThresholds {
        PermissionThresholds::default()
    }

    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> anyhow::Result<String> {
            Ok(format!("plain:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> bool {
            digest == format!("plain:{plaintext}")
        }
    }

    #[test]
    fn reader_cannot_create_post() {
        let th = thresholds();
        assert_eq!(
            can_create_post(&th, &actor(20)),
            Err(AccessDenied::InsufficientPermission)
        );
        assert_eq!(can_create_post(&th, &actor(40)), Ok(()));
    }

    #[test]
    fn threshold_gate_is_inclusive() {
        let th = thresholds();
        assert_eq!(can_view_home(&th, &actor(10)), Ok(()));
        assert_eq!(
            can_view_home(&th, &actor(9)),
            Err(AccessDenied::InsufficientPermission)
        );
        assert_eq!(can_manage_users(&th, &actor(80)), Ok(()));
    }

    #[test]
    fn change_role_denies_equal_levels() {
        let th = thresholds();
        // Equal levels are denied, not just strictly-lower actors.
        assert_eq!(
            can_change_role(&th, &actor(80), 80, 40),
            Err(AccessDenied::TargetNotBelow)
        );
        assert_eq!(
            can_change_role(&th, &actor(80), 40, 80),
            Err(AccessDenied::RoleNotBelow)
        );
    }

    #[test]
    fn change_role_requires_dominance_over_both() {
        let th = thresholds();
        assert_eq!(can_change_role(&th, &actor(100), 80, 40), Ok(()));
        assert_eq!(
            can_change_role(&th, &actor(100), 100, 40),
            Err(AccessDenied::TargetNotBelow)
        );
        assert_eq!(
            can_change_role(&th, &actor(40), 20, 10),
            Err(AccessDenied::InsufficientPermission)
        );
    }

    #[test]
    fn deactivate_allows_absent_target() {
        let th = thresholds();
        assert_eq!(can_deactivate(&th, &actor(80), None), Ok(()));
        assert_eq!(can_activate(&th, &actor(80), None), Ok(()));
    }

    #[test]
    fn deactivate_denies_peer_or_higher_target() {
        let th = thresholds();
        assert_eq!(
            can_deactivate(&th, &actor(80), Some(80)),
            Err(AccessDenied::TargetNotBelow)
        );
        assert_eq!(
            can_deactivate(&th, &actor(80), Some(100)),
            Err(AccessDenied::TargetNotBelow)
        );
        assert_eq!(can_deactivate(&th, &actor(80), Some(40)), Ok(()));
    }

    #[test]
    fn self_access_ignores_permission_level() {
        let me = actor(i32::MIN);
        assert_eq!(self_access(&me, &me.email), Ok(()));

        let other = EmailAddress::parse("other@example.com").unwrap();
        assert_eq!(self_access(&actor(100), &other), Err(AccessDenied::NotSelf));
    }

    #[test]
    fn password_change_distinguishes_failures() {
        let hasher = PlainHasher;
        let me = actor(10);
        let stored = hasher.hash("old-secret").unwrap();

        let wrong_old = PasswordChange {
            current: "guess",
            new: "fresh",
            confirm: "fresh",
        };
        assert_eq!(
            can_change_password(&me, &me.email, &stored, &wrong_old, &hasher),
            Err(AccessDenied::WrongCurrentPassword)
        );

        let mismatch = PasswordChange {
            current: "old-secret",
            new: "fresh",
            confirm: "freshh",
        };
        assert_eq!(
            can_change_password(&me, &me.email, &stored, &mismatch, &hasher),
            Err(AccessDenied::ConfirmationMismatch)
        );

        // Reusing the old password denies even though verification and
        // confirmation both succeed.
        let reuse = PasswordChange {
            current: "old-secret",
            new: "old-secret",
            confirm: "old-secret",
        };
        assert_eq!(
            can_change_password(&me, &me.email, &stored, &reuse, &hasher),
            Err(AccessDenied::PasswordUnchanged)
        );

        let ok = PasswordChange {
            current: "old-secret",
            new: "fresh",
            confirm: "fresh",
        };
        assert_eq!(
            can_change_password(&me, &me.email, &stored, &ok, &hasher),
            Ok(())
        );
    }

    #[test]
    fn create_user_denies_peer_level_role() {
        let th = thresholds();
        assert_eq!(
            can_create_user(&th, &actor(80), 80),
            Err(AccessDenied::RoleNotBelow)
        );
        assert_eq!(can_create_user(&th, &actor(80), 40), Ok(()));
    }

    proptest! {
        /// Allow iff the actor strictly dominates both the target user and
        /// the requested role (given the manage-users gate passes).
        #[test]
        fn change_role_allow_iff_strict_dominance(
            actor_level in -200i32..200,
            target_level in -200i32..200,
            role_level in -200i32..200,
        ) {
            let th = thresholds();
            let decision = can_change_role(&th, &actor(actor_level), target_level, role_level);
            let expected = actor_level >= th.manage_users
                && actor_level > target_level
                && actor_level > role_level;
            prop_assert_eq!(decision.is_ok(), expected);
        }

        /// The absent-target branch never changes the threshold decision.
        #[test]
        fn account_toggle_without_target_matches_gate(actor_level in -200i32..200) {
            let th = thresholds();
            let decision = can_deactivate(&th, &actor(actor_level), None);
            prop_assert_eq!(decision.is_ok(), actor_level >= th.manage_users);
        }
    }
}
