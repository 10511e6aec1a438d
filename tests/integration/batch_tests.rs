//! Batch query integration tests

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::fetch_title;
    use course_datalayer::{BatchOptions, BatchQueryExecutor, DataError, execute_batch_queries};
    use std::time::Duration;

    /// A missing row fails only its own slot
    #[tokio::test]
    async fn test_batch_lookup_with_missing_row() {
        let db = TestDatabase::seeded(5).await;
        let conn = db.db().connection();

        let ids = [1, 2, 99, 4, 5];
        let queries: Vec<_> = ids
            .iter()
            .map(|&id| move || fetch_title(conn, id))
            .collect();

        let batch = execute_batch_queries(queries, BatchOptions::default()).await;

        assert_eq!(batch.len(), 5);
        assert_eq!(batch.failed_indices(), vec![2]);
        assert!(matches!(batch.errors[0].error, DataError::NotFound(_)));
        assert_eq!(batch.get(0).map(String::as_str), Some("Problem 1"));
        assert_eq!(batch.get(3).map(String::as_str), Some("Problem 4"));
        assert!(batch.results[2].is_none());
    }

    /// More queries than the concurrency limit still all complete in order
    #[tokio::test]
    async fn test_batch_larger_than_concurrency() {
        let db = TestDatabase::seeded(12).await;
        let conn = db.db().connection();

        let queries: Vec<_> = (1..=12).map(|id| move || fetch_title(conn, id)).collect();
        let executor = BatchQueryExecutor::default()
            .with_concurrency(3)
            .with_timeout(Duration::from_secs(5));

        let batch = executor.execute(queries).await;

        assert!(batch.is_complete());
        let titles: Vec<String> = batch.results.into_iter().flatten().collect();
        let expected: Vec<String> = (1..=12).map(|id| format!("Problem {}", id)).collect();
        assert_eq!(titles, expected);
    }
}
