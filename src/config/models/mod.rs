//! Configuration data models
//!
//! This module defines all configuration structures used throughout the data layer.

pub mod batch;
pub mod cache;
pub mod logging;
pub mod storage;
pub mod transaction;

// Re-export all configuration types
pub use batch::*;
pub use cache::*;
pub use logging::*;
pub use storage::*;
pub use transaction::*;

/// Default maximum database connections
pub fn default_max_connections() -> u32 {
    10
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default cache entry TTL in seconds
pub fn default_cache_ttl() -> u64 {
    3600
}

/// Parse an optional environment value, naming the variable on failure
pub(crate) fn parse_env<T>(name: &str, value: Option<String>) -> crate::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            crate::DataError::Config(format!("Invalid value for {}: {} ({})", name, raw, e))
        }),
        None => Ok(None),
    }
}
