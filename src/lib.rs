//! # course-datalayer
//!
//! Data-access reliability layer for the course platform.
//!
//! ## Features
//!
//! - **Cache-aside caching**: typed JSON cache over Redis or an in-process store
//! - **Cascading invalidation**: one call clears an entity and every list and
//!   stats entry derived from it
//! - **Transactions**: isolation level, timeout, rollback on failure and
//!   flattening of nested calls
//! - **Retry**: linear backoff for deadlocks, timeouts and lost connections
//! - **Batch queries**: bounded concurrency with per-query timeouts and
//!   positional results
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use course_datalayer::{CacheKeyGenerator, Config, StorageLayer};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = StorageLayer::new(&config).await?;
//!
//!     let key = CacheKeyGenerator::entity("problem", 42);
//!     let title: String = storage
//!         .cache
//!         .with_cache(&key, Some(Duration::from_secs(300)), || async {
//!             Ok::<_, course_datalayer::DataError>("Two Sum".to_string())
//!         })
//!         .await?;
//!
//!     storage
//!         .transactions
//!         .execute_write(|_tx| async move { Ok(()) })
//!         .await?;
//!     storage.invalidator.invalidate_problem(42).await;
//!
//!     println!("{}", title);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::{CacheBackend, Config};
pub use storage::cache::{
    CacheInvalidator, CacheKeyGenerator, CacheManager, CacheStore, EntityKind, InvalidationScope,
    MemoryCacheStore, WithCache, create_cache_store,
};
pub use storage::database::{
    BatchOptions, BatchQueryExecutor, BatchResults, IsolationLevel, RetryPolicy, SeaOrmDatabase,
    TransactionManager, TransactionOptions, TransactionPreset, TransactionalClient,
    execute_batch_queries, execute_transaction, retry_transaction,
};
pub use storage::{StorageHealth, StorageLayer};
pub use utils::error::{DataError, DatabaseError, Result, TransactionErrorKind};
pub use utils::init_logging;

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
