//! `atrium-observability` — tracing/logging bootstrap for binaries.

pub mod tracing;

pub use tracing::{init, init_with_default};
