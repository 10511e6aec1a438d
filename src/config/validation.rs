//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.

use super::models::*;
use tracing::{debug, warn};

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating storage configuration");

        self.database.validate()?;
        self.cache.validate()?;

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        let supported = ["postgresql://", "postgres://", "sqlite:"];
        if !supported.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err("Only PostgreSQL and SQLite databases are supported".to_string());
        }

        if self.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        if self.max_connections > 1000 {
            return Err("Database max connections should not exceed 1000".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Database connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_ttl == 0 {
            return Err("Cache default TTL must be greater than 0".to_string());
        }

        // Any Redis problem falls back to the in-process store when the store
        // is built, so it is only reported here.
        if self.backend == CacheBackend::Redis && self.redis.is_configured() {
            if let Err(e) = self.redis.validate() {
                warn!("Redis endpoint will not be usable: {}", e);
            }
        }

        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err("Redis URL must start with redis:// or rediss://".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Redis connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for TransactionConfig {
    fn validate(&self) -> Result<(), String> {
        let timeouts = [
            ("read_only_timeout_ms", self.read_only_timeout_ms),
            ("write_timeout_ms", self.write_timeout_ms),
            ("user_timeout_ms", self.user_timeout_ms),
            ("problem_timeout_ms", self.problem_timeout_ms),
            ("class_timeout_ms", self.class_timeout_ms),
            ("report_timeout_ms", self.report_timeout_ms),
            ("stats_timeout_ms", self.stats_timeout_ms),
            ("batch_timeout_ms", self.batch_timeout_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(format!("Transaction {} must be greater than 0", name));
            }
        }

        if self.max_retries == 0 {
            return Err("Transaction max retries must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("Batch concurrency must be greater than 0".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Batch timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}
