//! Transaction integration tests
//!
//! Runs units of work against a real in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::{count_problems, fetch_title, insert_problem};
    use course_datalayer::{
        DataError, RetryPolicy, TransactionErrorKind, TransactionManager, TransactionOptions,
        execute_transaction, retry_transaction,
    };
    use sea_orm::DbErr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn transaction_kind(err: &DataError) -> TransactionErrorKind {
        match err {
            DataError::Database(inner) => inner.kind(),
            other => panic!("expected a wrapped transaction error, got {:?}", other),
        }
    }

    /// Committed writes are visible afterwards
    #[tokio::test]
    async fn test_commit_persists_writes() {
        let db = TestDatabase::new().await;
        let manager = TransactionManager::new(db.db_arc());

        manager
            .execute_write(|tx| async move {
                insert_problem(tx.as_ref(), 1, "Two Sum").await?;
                insert_problem(tx.as_ref(), 2, "Three Sum").await?;
                Ok(())
            })
            .await
            .expect("transaction should commit");

        assert_eq!(db.problem_count().await, 2);
        assert_eq!(fetch_title(db.db().connection(), 2).await.unwrap(), "Three Sum");
    }

    /// A failing unit of work leaves nothing behind
    #[tokio::test]
    async fn test_error_rolls_back_all_writes() {
        let db = TestDatabase::new().await;

        let result: course_datalayer::Result<()> =
            execute_transaction(db.db(), TransactionOptions::default(), |tx| async move {
                insert_problem(tx.as_ref(), 1, "Two Sum").await?;
                Err(DataError::validation("validation failed"))
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(transaction_kind(&err), TransactionErrorKind::Other);
        assert_eq!(db.problem_count().await, 0);
    }

    /// A constraint violation midway rolls back earlier statements
    #[tokio::test]
    async fn test_sql_error_rolls_back() {
        let db = TestDatabase::seeded(1).await;
        let manager = TransactionManager::new(db.db_arc());

        let result = manager
            .execute_write(|tx| async move {
                insert_problem(tx.as_ref(), 2, "Valid Parentheses").await?;
                insert_problem(tx.as_ref(), 1, "Duplicate").await?;
                Ok(())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(db.problem_count().await, 1);
        assert_eq!(fetch_title(db.db().connection(), 1).await.unwrap(), "Problem 1");
    }

    /// Exceeding the timeout rolls back
    #[tokio::test]
    async fn test_timeout_rolls_back() {
        let db = TestDatabase::new().await;
        let options = TransactionOptions::new(Duration::from_millis(50));

        let result: course_datalayer::Result<()> =
            execute_transaction(db.db(), options, |tx| async move {
                insert_problem(tx.as_ref(), 1, "Slow").await?;
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(transaction_kind(&err), TransactionErrorKind::Timeout);
        assert_eq!(db.problem_count().await, 0);
    }

    /// Nested calls share the outer transaction and its connection
    #[tokio::test]
    async fn test_nested_calls_share_transaction() {
        let db = TestDatabase::new().await;
        let manager = Arc::new(TransactionManager::new(db.db_arc()));

        let inner = Arc::clone(&manager);
        let seen = manager
            .execute_write(move |tx| async move {
                insert_problem(tx.as_ref(), 1, "Outer").await?;
                inner
                    .execute_write(|tx| async move {
                        insert_problem(tx.as_ref(), 2, "Inner").await?;
                        count_problems(tx.as_ref()).await
                    })
                    .await
            })
            .await
            .expect("nested transaction should commit");

        assert_eq!(seen, 2);
        assert_eq!(db.problem_count().await, 2);
    }

    /// Failure in a nested call discards the outer writes too
    #[tokio::test]
    async fn test_nested_failure_rolls_back_everything() {
        let db = TestDatabase::new().await;
        let manager = Arc::new(TransactionManager::new(db.db_arc()));

        let inner = Arc::clone(&manager);
        let result: course_datalayer::Result<()> = manager
            .execute_write(move |tx| async move {
                insert_problem(tx.as_ref(), 1, "Outer").await?;
                inner
                    .execute_write(|_| async { Err(DataError::validation("inner check failed")) })
                    .await
            })
            .await;

        assert!(result.is_err());
        assert_eq!(db.problem_count().await, 0);
    }

    /// Read-only preset runs queries on SQLite
    #[tokio::test]
    async fn test_read_only_preset() {
        let db = TestDatabase::seeded(3).await;
        let manager = TransactionManager::new(db.db_arc());

        let count = manager
            .execute_read_only(|tx| async move { count_problems(tx.as_ref()).await })
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    /// Lock conflicts are retried in fresh transactions
    #[tokio::test]
    async fn test_retry_after_lock_conflict() {
        let db = TestDatabase::new().await;
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy::new(3).with_base_delay(Duration::from_millis(1));

        retry_transaction(db.db(), TransactionOptions::default(), &policy, |tx| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                insert_problem(tx.as_ref(), attempt as i64, "Attempt").await?;
                if attempt < 3 {
                    return Err(DataError::Sql(DbErr::Custom("database is locked".to_string())));
                }
                Ok(())
            }
        })
        .await
        .expect("third attempt should commit");

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(db.problem_count().await, 1);
        assert_eq!(fetch_title(db.db().connection(), 3).await.unwrap(), "Attempt");
    }

    /// Permanent failures are not retried
    #[tokio::test]
    async fn test_no_retry_for_permanent_failure() {
        let db = TestDatabase::new().await;
        let attempts = AtomicU32::new(0);

        let result: course_datalayer::Result<()> = retry_transaction(
            db.db(),
            TransactionOptions::default(),
            &RetryPolicy::new(3).with_base_delay(Duration::from_millis(1)),
            |_| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DataError::validation("validation failed"))
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
