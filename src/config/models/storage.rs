//! Storage configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl StorageConfig {
    /// Build from an environment lookup function
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            cache: CacheConfig::from_lookup(&lookup)?,
        })
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Maximum connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
    /// Log every statement at debug level
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/course_platform".to_string(),
            max_connections: default_max_connections(),
            connection_timeout: default_connection_timeout(),
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// Build from an environment lookup function
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            config.url = url;
        }
        if let Some(max) =
            parse_env("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"))?
        {
            config.max_connections = max;
        }
        if let Some(timeout) =
            parse_env("DATABASE_CONNECTION_TIMEOUT", lookup("DATABASE_CONNECTION_TIMEOUT"))?
        {
            config.connection_timeout = timeout;
        }
        Ok(config)
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}
