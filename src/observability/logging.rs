//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber that reads its filter from
/// `RUST_LOG`, defaulting to `info`. Safe to call more than once; later
/// calls are no-ops if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
