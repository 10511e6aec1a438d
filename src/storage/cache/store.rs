//! Cache store abstraction
//!
//! Both the in-process and the Redis store implement [`CacheStore`] with the
//! same semantics: reads never return an expired entry, `ttl` reports
//! [`TTL_MISSING`] for absent or expired keys, and `keys("*")` lists every
//! live key.

use crate::config::CacheBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// `ttl` result for a key that does not exist or has expired
pub const TTL_MISSING: i64 = -2;

/// Key-value store with per-entry expiry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` for `ttl_seconds`
    async fn set(&self, key: &str, ttl_seconds: u64, value: Bytes) -> Result<()>;

    /// Delete keys, returning how many live entries were removed
    async fn del(&self, keys: &[String]) -> Result<u64>;

    /// List live keys matching a `*` wildcard pattern
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Seconds until expiry, or [`TTL_MISSING`]
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// Which backend this store talks to
    fn backend(&self) -> CacheBackend;
}
