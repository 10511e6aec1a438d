//! Test database utilities
//!
//! Provides in-memory SQLite database for testing without external dependencies.
//! Each test gets an isolated database instance with a `problems` table.

use course_datalayer::config::DatabaseConfig;
use course_datalayer::{DataError, Result, SeaOrmDatabase};
use sea_orm::{ConnectionTrait, Statement};
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<SeaOrmDatabase>,
}

impl TestDatabase {
    /// Create a new in-memory test database
    ///
    /// Every call creates a completely isolated database instance.
    pub async fn new() -> Self {
        let db = SeaOrmDatabase::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");

        db.connection()
            .execute_unprepared(
                "CREATE TABLE problems (id INTEGER PRIMARY KEY, title TEXT NOT NULL)",
            )
            .await
            .expect("Failed to create problems table");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Create a test database with problems 1..=count
    pub async fn seeded(count: i64) -> Self {
        let db = Self::new().await;
        for id in 1..=count {
            insert_problem(db.db().connection(), id, &format!("Problem {}", id))
                .await
                .expect("Failed to seed problem");
        }
        db
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &SeaOrmDatabase {
        &self.inner
    }

    /// Get Arc to the underlying database
    pub fn db_arc(&self) -> Arc<SeaOrmDatabase> {
        Arc::clone(&self.inner)
    }

    /// Number of committed problems
    pub async fn problem_count(&self) -> i64 {
        count_problems(self.inner.connection())
            .await
            .expect("Failed to count problems")
    }
}

/// Helper to create a simple test database config
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1, // In-memory DB only lives as long as its single connection
        connection_timeout: 5,
        sqlx_logging: false,
    }
}

pub async fn insert_problem<C: ConnectionTrait>(conn: &C, id: i64, title: &str) -> Result<()> {
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO problems (id, title) VALUES (?, ?)",
        [id.into(), title.into()],
    ))
    .await?;
    Ok(())
}

pub async fn fetch_title<C: ConnectionTrait>(conn: &C, id: i64) -> Result<String> {
    let backend = conn.get_database_backend();
    let row = conn
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT title FROM problems WHERE id = ?",
            [id.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(row.try_get::<String>("", "title")?),
        None => Err(DataError::not_found(format!("problem {}", id))),
    }
}

pub async fn count_problems<C: ConnectionTrait>(conn: &C) -> Result<i64> {
    let backend = conn.get_database_backend();
    let row = conn
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS count FROM problems",
        ))
        .await?
        .ok_or_else(|| DataError::internal("COUNT returned no row"))?;
    Ok(row.try_get::<i64>("", "count")?)
}
