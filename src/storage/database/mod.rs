//! Database access: connections, transactions and batch queries

mod batch;
mod client;
mod connection;
mod retry;
mod transaction;
mod types;

pub use batch::{
    BatchOptions, BatchQuery, BatchQueryError, BatchQueryExecutor, BatchResults,
    execute_batch_queries,
};
pub use client::TransactionalClient;
pub use connection::{DatabaseBackendType, SeaOrmDatabase};
pub use retry::{RetryPolicy, retry_transaction};
pub use transaction::{
    TransactionHandle, TransactionManager, execute_batch_transaction, execute_preset_transaction,
    execute_read_only_transaction, execute_transaction, execute_write_transaction,
};
pub use types::{IsolationLevel, TransactionOptions, TransactionPreset};
