//! Logging initialization for the notification service.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize the logging system.
///
/// Sets up tracing with stderr output and a filter from the `RUST_LOG` env
/// var, falling back to the provided default level. Safe to call more than
/// once; only the first call installs a subscriber.
///
/// # Example
///
/// ```ignore
/// init_logging("info");
/// tracing::info!("service started");
/// ```
pub fn init_logging(level: &str) {
    let level = level.to_string();
    INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
