//! Application error taxonomy shared by the rule engine and the mutation
//! executors.
//!
//! Route-level callers catch this type specifically and pass the status code
//! and user message through; anything else they catch generically maps to
//! `Unexpected`.

use thiserror::Error;

use atrium_core::DomainError;

use crate::rules::AccessDenied;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// No resolvable session/actor.
    #[error("authentication required")]
    Unauthenticated,

    /// The rule engine denied the operation; the message varies by rule.
    #[error("{0}")]
    Forbidden(#[from] AccessDenied),

    /// Missing or malformed required fields.
    #[error("{0}")]
    InvalidInput(String),

    /// Duplicate category name, already-registered email, and the like.
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// Store/provider failure. The cause is logged with context at the
    /// route boundary and never exposed to the caller.
    #[error("internal error")]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden(_) => 403,
            Self::InvalidInput(_) => 400,
            Self::Conflict(_) => 409,
            Self::NotFound => 404,
            Self::Unexpected(_) => 500,
        }
    }

    /// Machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
            Self::NotFound => "not_found",
            Self::Unexpected(_) => "internal_error",
        }
    }

    /// Message safe to show to the caller.
    ///
    /// `Unexpected` deliberately collapses to a generic message; the
    /// internal description lives in the log line, not the response.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => Self::NotFound,
            DomainError::Conflict(msg) => Self::Conflict(msg),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ServiceError::Unauthenticated.status_code(), 401);
        assert_eq!(
            ServiceError::Forbidden(AccessDenied::InsufficientPermission).status_code(),
            403
        );
        assert_eq!(ServiceError::invalid_input("x").status_code(), 400);
        assert_eq!(ServiceError::conflict("x").status_code(), 409);
        assert_eq!(ServiceError::NotFound.status_code(), 404);
        assert_eq!(
            ServiceError::Unexpected(anyhow::anyhow!("boom")).status_code(),
            500
        );
    }

    #[test]
    fn unexpected_never_leaks_the_cause() {
        let err = ServiceError::Unexpected(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.user_message(), "internal error");
    }

    #[test]
    fn deny_reasons_surface_distinct_messages() {
        let wrong = ServiceError::Forbidden(AccessDenied::WrongCurrentPassword);
        let reuse = ServiceError::Forbidden(AccessDenied::PasswordUnchanged);
        assert_ne!(wrong.user_message(), reuse.user_message());
    }
}
