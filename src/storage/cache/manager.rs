//! Typed cache facade
//!
//! [`CacheManager`] serializes values as JSON and forwards them to a
//! [`CacheStore`]. Cache trouble never reaches the caller: store errors and
//! undecodable values are logged and reported as a miss, `false`, `0` or
//! [`TTL_MISSING`](super::TTL_MISSING).

use super::factory::create_cache_store;
use super::memory::MemoryCacheStore;
use super::store::{CacheStore, TTL_MISSING};
use super::types::{AtomicCacheStats, CacheStats};
use super::with_cache::cache_aside;
use crate::config::{CacheBackend, CacheConfig, default_cache_ttl};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// JSON cache on top of a [`CacheStore`]
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
    stats: Arc<AtomicCacheStats>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("backend", &self.store.backend())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl CacheManager {
    /// Create a manager with the default TTL of one hour
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_default_ttl(store, Duration::from_secs(default_cache_ttl()))
    }

    pub fn with_default_ttl(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self {
            store,
            default_ttl,
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }

    /// Manager over a fresh in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()))
    }

    /// Build the store selected by `config` and wrap it
    pub async fn from_config(config: &CacheConfig) -> Self {
        let store = create_cache_store(config).await;
        Self::with_default_ttl(store, config.default_ttl())
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn backend(&self) -> CacheBackend {
        self.store.backend()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Read and decode a value; any failure is a miss
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                AtomicCacheStats::record(&self.stats.misses, 1);
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                AtomicCacheStats::record(&self.stats.misses, 1);
                warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => {
                AtomicCacheStats::record(&self.stats.hits, 1);
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.deserialization_failures, 1);
                AtomicCacheStats::record(&self.stats.misses, 1);
                warn!(key, error = %e, "Cached value could not be decoded, treating as miss");
                None
            }
        }
    }

    /// Encode and store a value; `ttl` defaults to the manager's default TTL
    ///
    /// TTLs below one second are rounded up to one second.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool
    where
        T: Serialize + ?Sized,
    {
        let payload = match serde_json::to_vec(value) {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(key, error = %e, "Value could not be encoded for caching");
                return false;
            }
        };

        let ttl_seconds = ttl.unwrap_or(self.default_ttl).as_secs().max(1);
        match self.store.set(key, ttl_seconds, payload).await {
            Ok(()) => {
                AtomicCacheStats::record(&self.stats.sets, 1);
                debug!(key, ttl_seconds, "Cached value");
                true
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Delete one key; `true` when the store accepted the delete
    pub async fn delete(&self, key: &str) -> bool {
        match self.store.del(&[key.to_string()]).await {
            Ok(removed) => {
                AtomicCacheStats::record(&self.stats.deletes, removed);
                true
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    /// Delete several keys, returning how many existed
    pub async fn delete_many(&self, keys: &[String]) -> u64 {
        if keys.is_empty() {
            return 0;
        }
        match self.store.del(keys).await {
            Ok(removed) => {
                AtomicCacheStats::record(&self.stats.deletes, removed);
                removed
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(count = keys.len(), error = %e, "Cache delete failed");
                0
            }
        }
    }

    /// Delete every key matching a `*` pattern, returning how many were removed
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let keys = match self.store.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(pattern, error = %e, "Cache key scan failed");
                return 0;
            }
        };

        if keys.is_empty() {
            return 0;
        }

        let removed = self.delete_many(&keys).await;
        debug!(pattern, removed, "Deleted cache keys by pattern");
        removed
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.store.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(key, error = %e, "Cache exists check failed");
                false
            }
        }
    }

    /// Remaining TTL in seconds, or `-2` for a missing key or a failed lookup
    pub async fn get_ttl(&self, key: &str) -> i64 {
        match self.store.ttl(key).await {
            Ok(ttl) => ttl,
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors, 1);
                warn!(key, error = %e, "Cache TTL lookup failed");
                TTL_MISSING
            }
        }
    }

    /// Cache-aside read: return the cached value or compute, store and return it
    ///
    /// Errors from `origin` propagate and nothing is cached.
    pub async fn with_cache<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        origin: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        cache_aside(self, key, ttl, origin).await
    }
}
