//! Cache integration tests
//!
//! Cache-aside reads over the database and invalidation after writes.

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::{fetch_title, insert_problem};
    use crate::common::fixtures::{self, Problem};
    use course_datalayer::config::CacheConfig;
    use course_datalayer::{
        CacheBackend, CacheInvalidator, CacheKeyGenerator, CacheManager, DataError,
        TransactionManager, WithCache,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// The data source runs once; later reads come from the cache
    #[tokio::test]
    async fn test_cache_aside_over_database() {
        let db = TestDatabase::seeded(1).await;
        let cache = Arc::new(CacheManager::in_memory());
        let loads = Arc::new(AtomicUsize::new(0));
        let key = CacheKeyGenerator::entity("problem", 1);

        for _ in 0..3 {
            let loads = Arc::clone(&loads);
            let conn = db.db().connection();
            let title: Result<String, DataError> = cache
                .with_cache(&key, None, || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    fetch_title(conn, 1).await
                })
                .await;
            assert_eq!(title.unwrap(), "Problem 1");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    /// Missing rows are reported, not cached
    #[tokio::test]
    async fn test_cache_aside_propagates_source_errors() {
        let db = TestDatabase::new().await;
        let cache = Arc::new(CacheManager::in_memory());
        let cached = WithCache::keyed_by(Arc::clone(&cache), |id: &i64| {
            CacheKeyGenerator::entity("problem", id)
        });

        let conn = db.db().connection();
        let result: Result<String, DataError> =
            cached.call(404, |id| async move { fetch_title(conn, id).await }).await;

        assert!(matches!(result, Err(DataError::NotFound(_))));
        assert!(!cache.exists("problem:404").await);
    }

    /// Write, invalidate, and the next read sees the new row
    #[tokio::test]
    async fn test_invalidation_after_write() {
        let db = TestDatabase::seeded(1).await;
        let cache = Arc::new(CacheManager::in_memory());
        let invalidator = CacheInvalidator::new(Arc::clone(&cache));
        let manager = TransactionManager::new(db.db_arc());
        let list_key = CacheKeyGenerator::query("problem", &json!({"page": 1}));

        let db_ref = &db;
        let load_titles = move || async move {
            let conn = db_ref.db().connection();
            let mut titles = Vec::new();
            for id in 1..=2 {
                if let Ok(title) = fetch_title(conn, id).await {
                    titles.push(title);
                }
            }
            Ok::<_, DataError>(titles)
        };

        let before = cache.with_cache(&list_key, None, load_titles).await.unwrap();
        assert_eq!(before, vec!["Problem 1"]);

        manager
            .execute_write(|tx| async move { insert_problem(tx.as_ref(), 2, "Problem 2").await })
            .await
            .unwrap();

        // Still the cached list until invalidated
        let stale = cache.with_cache(&list_key, None, load_titles).await.unwrap();
        assert_eq!(stale, vec!["Problem 1"]);

        assert!(invalidator.invalidate_problem(2).await >= 1);

        let fresh = cache.with_cache(&list_key, None, load_titles).await.unwrap();
        assert_eq!(fresh, vec!["Problem 1", "Problem 2"]);
    }

    /// Entity, list and stats keys all go; unrelated entities stay
    #[tokio::test]
    async fn test_problem_invalidation_completeness() {
        let cache = Arc::new(CacheManager::in_memory());
        let keys = fixtures::populate_cache(&cache).await;
        let invalidator = CacheInvalidator::new(Arc::clone(&cache));

        let removed = invalidator.invalidate_problem(1).await;
        assert_eq!(removed, 3);

        for key in &keys[..3] {
            assert!(!cache.exists(key).await, "{} should be gone", key);
        }
        assert!(cache.exists("class:1").await);
        assert_eq!(cache.get::<Problem>("class:1").await, Some(fixtures::problem(1)));
    }

    /// Query keys do not depend on field order
    #[tokio::test]
    async fn test_query_key_permutation() {
        let cache = CacheManager::in_memory();
        let written =
            CacheKeyGenerator::query("problem", &json!({"page": 1, "difficulty": "easy"}));
        let read = CacheKeyGenerator::query("problem", &json!({"difficulty": "easy", "page": 1}));

        cache.set(&written, &vec![fixtures::problem(1)], None).await;
        let hit: Option<Vec<Problem>> = cache.get(&read).await;
        assert_eq!(hit, Some(vec![fixtures::problem(1)]));
    }

    /// Entries disappear after their TTL
    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = CacheManager::in_memory();
        cache
            .set("problem:1", &fixtures::problem(1), Some(Duration::from_secs(1)))
            .await;
        assert!(cache.get_ttl("problem:1").await >= 0);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(cache.get::<Problem>("problem:1").await.is_none());
        assert_eq!(cache.get_ttl("problem:1").await, -2);
    }

    /// Redis requested without a reachable server falls back to memory
    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let mut config = CacheConfig {
            backend: CacheBackend::Redis,
            ..CacheConfig::default()
        };
        config.redis.url = "redis://127.0.0.1:1".to_string();
        config.redis.connection_timeout = 1;

        let cache = CacheManager::from_config(&config).await;
        assert_eq!(cache.backend(), CacheBackend::Memory);
        assert!(cache.set("problem:1", &fixtures::problem(1), None).await);
    }
}
