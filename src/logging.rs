//! Logging setup for hosts that do not install their own subscriber.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `SYSTRAY_LOG=debug`.
pub const LOG_ENV: &str = "SYSTRAY_LOG";

/// Installs a formatted `tracing` subscriber filtered by [`LOG_ENV`]
/// (default `info`). Does nothing if a global subscriber is already set.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
