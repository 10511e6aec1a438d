//! Cache store selection

use super::memory::MemoryCacheStore;
use super::store::CacheStore;
use crate::config::{CacheBackend, CacheConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the store selected by `config`
///
/// Never fails: when Redis is requested but unusable (no URL, feature
/// disabled, connection failure) the in-process store is used instead and a
/// warning is logged.
pub async fn create_cache_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    match config.backend {
        CacheBackend::Memory => {
            info!("Using in-process cache store");
            Arc::new(MemoryCacheStore::new())
        }
        CacheBackend::Redis => connect_redis_or_fallback(config).await,
    }
}

#[cfg(feature = "redis")]
async fn connect_redis_or_fallback(config: &CacheConfig) -> Arc<dyn CacheStore> {
    use super::redis_store::RedisCacheStore;

    if !config.redis.is_configured() {
        warn!("Redis cache backend selected without a URL, falling back to in-process store");
        return Arc::new(MemoryCacheStore::new());
    }

    match RedisCacheStore::connect(&config.redis).await {
        Ok(store) => {
            info!("Using Redis cache store");
            Arc::new(store)
        }
        Err(e) => {
            warn!("Redis cache store unavailable, falling back to in-process store: {}", e);
            Arc::new(MemoryCacheStore::new())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_redis_or_fallback(_config: &CacheConfig) -> Arc<dyn CacheStore> {
    warn!(
        "Redis cache backend selected but the `redis` feature is disabled, \
         falling back to in-process store"
    );
    Arc::new(MemoryCacheStore::new())
}
