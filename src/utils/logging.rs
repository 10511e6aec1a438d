//! Logging initialisation
//!
//! The library itself only emits `tracing` events; embedding services call
//! [`init_logging`] once at startup to install a subscriber.

use crate::config::LoggingConfig;
use crate::utils::error::{DataError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Fails with
/// [`DataError::Config`] if the filter is malformed or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            DataError::Config(format!("Invalid log level '{}': {}", config.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| DataError::Config(format!("Failed to install logger: {}", e)))
}
