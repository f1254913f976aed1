//! Diagnostic logging to stderr, filtered by `PINDROP_LOG`

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "PINDROP_LOG";

/// Installs the global subscriber. Defaults to warnings only so the
/// regular status lines stay readable.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
