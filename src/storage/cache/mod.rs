//! Caching layer
//!
//! A [`CacheStore`] holds raw bytes with per-entry expiry, either in process
//! ([`MemoryCacheStore`]) or in Redis. [`CacheManager`] adds typed JSON
//! access and swallows cache failures, [`CacheInvalidator`] clears entity
//! scopes after writes, and [`WithCache`] wraps data sources with
//! cache-aside reads.

mod factory;
mod invalidator;
mod keys;
mod manager;
mod memory;
pub mod pattern;
#[cfg(feature = "redis")]
mod redis_store;
mod store;
mod types;
mod with_cache;

pub use factory::create_cache_store;
pub use invalidator::{CacheInvalidator, InvalidationScope};
pub use keys::{CacheKeyGenerator, EntityKind};
pub use manager::CacheManager;
pub use memory::MemoryCacheStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisCacheStore;
pub use store::{CacheStore, TTL_MISSING};
pub use types::{AtomicCacheStats, CacheEntry, CacheStats};
pub use with_cache::{CacheKeySource, KeyFn, WithCache};
