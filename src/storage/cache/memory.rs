//! In-process cache store
//!
//! Entries live in a sharded `DashMap` and are evicted lazily: an expired
//! entry is dropped by the first read that notices it. [`MemoryCacheStore::purge_expired`]
//! sweeps everything at once for callers that want to bound memory.

use super::pattern;
use super::store::{CacheStore, TTL_MISSING};
use super::types::CacheEntry;
use crate::config::CacheBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cache store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        removed
    }

    /// Remove `key` if its entry expired at `now`
    fn evict_if_expired(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, entry| entry.is_expired_at(now));
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.evict_if_expired(key, now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, ttl_seconds: u64, value: Bytes) -> Result<()> {
        let entry = CacheEntry::new(value, Duration::from_secs(ttl_seconds));
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(key) {
                if !entry.is_expired_at(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let keys = self
            .entries
            .iter()
            .filter(|item| {
                !item.value().is_expired_at(now) && pattern::matches(pattern, item.key())
            })
            .map(|item| item.key().clone())
            .collect();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let remaining = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => Some(entry.remaining(now)),
            _ => None,
        };

        match remaining {
            // Rounded to the nearest second, as Redis reports it
            Some(left) => Ok(((left.as_millis() + 500) / 1000) as i64),
            None => {
                self.evict_if_expired(key, now);
                Ok(TTL_MISSING)
            }
        }
    }

    fn backend(&self) -> CacheBackend {
        CacheBackend::Memory
    }
}
