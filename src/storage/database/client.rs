//! Transaction primitives of a database client
//!
//! The transaction manager only needs begin, commit and rollback. Keeping
//! that behind a trait lets the manager run against SeaORM in production and
//! against an in-memory double in tests.

use super::connection::SeaOrmDatabase;
use super::types::TransactionOptions;
use crate::utils::error::Result;
use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseTransaction, TransactionTrait};

/// A client that can open transactions
#[async_trait]
pub trait TransactionalClient: Send + Sync {
    /// Handle passed to units of work
    type Transaction: Send + Sync + 'static;

    /// Open a transaction with the given isolation and access mode
    async fn begin(&self, options: &TransactionOptions) -> Result<Self::Transaction>;

    async fn commit(&self, transaction: Self::Transaction) -> Result<()>;

    async fn rollback(&self, transaction: Self::Transaction) -> Result<()>;
}

#[async_trait]
impl TransactionalClient for SeaOrmDatabase {
    type Transaction = DatabaseTransaction;

    async fn begin(&self, options: &TransactionOptions) -> Result<DatabaseTransaction> {
        let access_mode = if options.read_only {
            AccessMode::ReadOnly
        } else {
            AccessMode::ReadWrite
        };

        let transaction = self
            .connection()
            .begin_with_config(Some(options.isolation_level.into()), Some(access_mode))
            .await?;
        Ok(transaction)
    }

    async fn commit(&self, transaction: DatabaseTransaction) -> Result<()> {
        transaction.commit().await?;
        Ok(())
    }

    async fn rollback(&self, transaction: DatabaseTransaction) -> Result<()> {
        transaction.rollback().await?;
        Ok(())
    }
}
