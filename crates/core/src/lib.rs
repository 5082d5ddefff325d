//! `atrium-core` — shared identifiers and the domain error model.
//!
//! This crate is intentionally free of HTTP, storage, and async concerns.

pub mod email;
pub mod error;
pub mod id;

pub use email::EmailAddress;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, CommentId, PostId, RoleId, UserId};
