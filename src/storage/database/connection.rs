use crate::config::DatabaseConfig;
use crate::utils::error::{DataError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::{debug, info};

/// Database backend type indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    PostgreSQL,
    SQLite,
}

/// SeaORM connection pool
#[derive(Debug)]
pub struct SeaOrmDatabase {
    db: DatabaseConnection,
    backend_type: DatabaseBackendType,
}

impl SeaOrmDatabase {
    /// Open a connection pool for `config.url`
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let backend_type = if config.is_sqlite() {
            DatabaseBackendType::SQLite
        } else {
            DatabaseBackendType::PostgreSQL
        };

        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(config.sqlx_logging)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(opt).await?;
        info!("Database connection established ({:?})", backend_type);
        Ok(Self { db, backend_type })
    }

    /// Wrap an existing connection
    pub fn from_connection(db: DatabaseConnection) -> Self {
        let backend_type = match db.get_database_backend() {
            sea_orm::DatabaseBackend::Sqlite => DatabaseBackendType::SQLite,
            _ => DatabaseBackendType::PostgreSQL,
        };
        Self { db, backend_type }
    }

    pub fn backend_type(&self) -> DatabaseBackendType {
        self.backend_type
    }

    /// Get the underlying database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Close the database connection
    pub async fn close(self) -> Result<()> {
        self.db.close().await.map_err(DataError::Sql)
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");

        let backend = self.db.get_database_backend();
        self.db
            .query_one(Statement::from_string(backend, "SELECT 1"))
            .await?;

        debug!("Database health check passed");
        Ok(())
    }
}
