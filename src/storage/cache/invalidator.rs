//! Entity-scoped cache invalidation

use super::keys::{CacheKeyGenerator, EntityKind};
use super::manager::CacheManager;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Keys and patterns to remove together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationScope {
    pub exact_keys: Vec<String>,
    pub patterns: Vec<String>,
}

impl InvalidationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.exact_keys.push(key.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Everything cached about one entity
    ///
    /// Covers the entity key, every query result and stats entry of its type,
    /// keys nested under the entity, and query results of dependent types.
    pub fn for_entity(kind: EntityKind, id: impl fmt::Display) -> Self {
        let entity_type = kind.as_str();
        let mut scope = Self::new()
            .key(CacheKeyGenerator::entity(entity_type, &id))
            .pattern(CacheKeyGenerator::query_pattern(entity_type))
            .pattern(CacheKeyGenerator::stats_pattern(entity_type))
            .pattern(CacheKeyGenerator::children_pattern(entity_type, &id));

        for dependent in kind.dependents() {
            scope = scope.pattern(CacheKeyGenerator::query_pattern(dependent.as_str()));
        }
        scope
    }

    /// The whole keyspace
    pub fn everything() -> Self {
        Self::new().pattern("*")
    }

    pub fn is_empty(&self) -> bool {
        self.exact_keys.is_empty() && self.patterns.is_empty()
    }
}

/// Removes stale entries after writes
///
/// All deletes of a scope run concurrently. Individual failures are logged by
/// the [`CacheManager`] and do not stop the others.
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    cache: Arc<CacheManager>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Remove everything in `scope`, returning the number of keys deleted
    pub async fn invalidate(&self, scope: &InvalidationScope) -> u64 {
        let exact = self.cache.delete_many(&scope.exact_keys);
        let sweeps = join_all(
            scope
                .patterns
                .iter()
                .map(|pattern| self.cache.delete_pattern(pattern)),
        );

        let (exact_removed, swept) = futures::join!(exact, sweeps);
        let removed = exact_removed + swept.iter().sum::<u64>();
        debug!(
            keys = scope.exact_keys.len(),
            patterns = scope.patterns.len(),
            removed,
            "Cache invalidated"
        );
        removed
    }

    pub async fn invalidate_entity(&self, kind: EntityKind, id: impl fmt::Display) -> u64 {
        self.invalidate(&InvalidationScope::for_entity(kind, id)).await
    }

    pub async fn invalidate_problem(&self, id: impl fmt::Display) -> u64 {
        self.invalidate_entity(EntityKind::Problem, id).await
    }

    pub async fn invalidate_class(&self, id: impl fmt::Display) -> u64 {
        self.invalidate_entity(EntityKind::Class, id).await
    }

    pub async fn invalidate_user(&self, id: impl fmt::Display) -> u64 {
        self.invalidate_entity(EntityKind::User, id).await
    }

    /// Clear the whole cache
    pub async fn invalidate_all(&self) -> u64 {
        let removed = self.invalidate(&InvalidationScope::everything()).await;
        info!(removed, "Entire cache invalidated");
        removed
    }
}
