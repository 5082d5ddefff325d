//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process: JSON lines, filterable via
/// `RUST_LOG`.
///
/// Safe to call more than once (later calls are no-ops).
pub fn init() {
    init_with_default("info");
}

/// Initialize with an explicit fallback filter, for tools and tests that
/// want a different default verbosity.
pub fn init_with_default(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(true)
        .try_init();
}
