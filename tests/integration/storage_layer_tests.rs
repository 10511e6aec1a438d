//! Storage layer wiring tests

#[cfg(test)]
mod tests {
    use crate::common::database::{count_problems, insert_problem, test_db_config};
    use course_datalayer::{CacheBackend, Config, StorageLayer};
    use sea_orm::ConnectionTrait;

    fn sqlite_config() -> Config {
        let mut config = Config::default();
        config.storage.database = test_db_config();
        config
    }

    #[tokio::test]
    async fn test_storage_layer_from_config() {
        let storage = StorageLayer::new(&sqlite_config())
            .await
            .expect("storage layer should start");

        let health = storage.health_check().await;
        assert!(health.is_healthy(), "unhealthy: {:?}", health);
        assert_eq!(health.cache_backend, CacheBackend::Memory);
        assert_eq!(storage.batch.options().concurrency, 5);
        assert_eq!(storage.cache.default_ttl().as_secs(), 3600);
    }

    #[tokio::test]
    async fn test_storage_layer_write_and_invalidate() {
        let storage = StorageLayer::new(&sqlite_config()).await.unwrap();
        storage
            .database
            .connection()
            .execute_unprepared(
                "CREATE TABLE problems (id INTEGER PRIMARY KEY, title TEXT NOT NULL)",
            )
            .await
            .unwrap();

        storage.cache.set("problem:1", "stale", None).await;
        storage.cache.set("problems:{}", &Vec::<i64>::new(), None).await;

        let count = storage
            .transactions
            .execute_write(|tx| async move {
                insert_problem(tx.as_ref(), 1, "Two Sum").await?;
                count_problems(tx.as_ref()).await
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        assert_eq!(storage.invalidator.invalidate_problem(1).await, 2);
        assert!(!storage.cache.exists("problem:1").await);
    }
}
