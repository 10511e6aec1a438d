//! Common test utilities for course-datalayer
//!
//! This module provides shared test infrastructure for all tests:
//! - In-memory SQLite database support
//! - Problem fixtures
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{TestDatabase, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = TestDatabase::new().await;
//!     let problem = fixtures::problem(1);
//!     // ...
//! }
//! ```

pub mod database;
pub mod fixtures;

// Re-export commonly used items
pub use database::TestDatabase;
pub use fixtures::Problem;
