//! Storage layer for the course platform
//!
//! This module wires the database pool, the cache and the transaction
//! manager together. Nothing here is global: build a [`StorageLayer`] once at
//! startup and hand it (or its parts) to the services that need it.

/// Caching module
pub mod cache;
/// Database module
pub mod database;

use crate::config::{BatchConfig, CacheBackend, Config, TransactionConfig};
use crate::utils::error::Result;
use cache::{CacheInvalidator, CacheManager};
use database::{BatchQueryExecutor, SeaOrmDatabase, TransactionManager};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Probe key used by [`StorageLayer::health_check`]
const HEALTH_CHECK_KEY: &str = "__health__";

/// Database, cache and transaction services sharing one configuration
#[derive(Debug, Clone)]
pub struct StorageLayer {
    /// Database connection pool
    pub database: Arc<SeaOrmDatabase>,
    /// Typed cache
    pub cache: Arc<CacheManager>,
    /// Cache invalidation for entity writes
    pub invalidator: CacheInvalidator,
    /// Transaction runner over `database`
    pub transactions: Arc<TransactionManager<SeaOrmDatabase>>,
    /// Batch query runner
    pub batch: BatchQueryExecutor,
}

/// Result of [`StorageLayer::health_check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHealth {
    pub database: bool,
    pub cache: bool,
    pub cache_backend: CacheBackend,
}

impl StorageHealth {
    pub fn is_healthy(&self) -> bool {
        self.database && self.cache
    }
}

impl StorageLayer {
    /// Connect the database and build the cache selected by `config`
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing storage layer");

        debug!("Connecting to database");
        let database = Arc::new(SeaOrmDatabase::new(&config.storage.database).await?);

        debug!("Creating cache ({} backend requested)", config.storage.cache.backend);
        let cache = Arc::new(CacheManager::from_config(&config.storage.cache).await);

        let layer = Self::from_parts(database, cache, config.transaction.clone(), &config.batch);
        info!(
            "Storage layer initialized (cache backend: {})",
            layer.cache.backend()
        );
        Ok(layer)
    }

    /// Assemble from already constructed parts
    pub fn from_parts(
        database: Arc<SeaOrmDatabase>,
        cache: Arc<CacheManager>,
        transaction: TransactionConfig,
        batch: &BatchConfig,
    ) -> Self {
        Self {
            invalidator: CacheInvalidator::new(Arc::clone(&cache)),
            transactions: Arc::new(TransactionManager::with_config(
                Arc::clone(&database),
                transaction,
            )),
            batch: BatchQueryExecutor::new(batch.options()),
            database,
            cache,
        }
    }

    /// Probe the database and the cache store
    pub async fn health_check(&self) -> StorageHealth {
        let database = match self.database.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        };

        let cache = match self.cache.store().exists(HEALTH_CHECK_KEY).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Cache health check failed: {}", e);
                false
            }
        };

        StorageHealth {
            database,
            cache,
            cache_backend: self.cache.backend(),
        }
    }
}
