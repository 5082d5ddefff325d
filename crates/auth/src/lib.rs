//! `atrium-auth` — session resolution, the permission rule engine, and the
//! application error taxonomy.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod actor;
pub mod error;
pub mod password;
pub mod rules;
pub mod session;
pub mod thresholds;

pub use actor::{Actor, Identity};
pub use error::ServiceError;
pub use password::PasswordHasher;
pub use rules::{AccessDenied, PasswordChange};
pub use session::{SessionClaims, SessionCodec};
pub use thresholds::PermissionThresholds;
