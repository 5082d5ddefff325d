//! `atrium-infra` — store implementations and provider adapters.
//!
//! In-memory stores back dev and test wiring; Postgres-backed stores live
//! behind the `postgres` feature. Workspace-level integration tests follow
//! the same convention as the rest of the infra layer and live here.

pub mod memory;
pub mod password;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(test)]
mod integration_tests;

pub use memory::{
    MemoryCatalogStore, MemoryContentStore, MemoryDirectoryStore, MemoryRoleStore,
};
pub use password::Argon2PasswordHasher;
