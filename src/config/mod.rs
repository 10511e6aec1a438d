//! Configuration management for the data layer
//!
//! This module handles loading, validation, and management of all configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the data layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database and cache configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Transaction presets and retry settings
    #[serde(default)]
    pub transaction: TransactionConfig,
    /// Batch query defaults
    #[serde(default)]
    pub batch: BatchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DataError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| DataError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables (and a `.env` file if present)
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            storage: StorageConfig::from_lookup(&lookup)?,
            transaction: TransactionConfig::default(),
            batch: BatchConfig::default(),
            logging: LoggingConfig::from_lookup(&lookup),
        };

        config.validate()?;
        Ok(config)
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.storage
            .validate()
            .map_err(|e| DataError::Config(format!("Storage config error: {}", e)))?;

        self.transaction
            .validate()
            .map_err(|e| DataError::Config(format!("Transaction config error: {}", e)))?;

        self.batch
            .validate()
            .map_err(|e| DataError::Config(format!("Batch config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| DataError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}
