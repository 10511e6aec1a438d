//! Integration tests for course-datalayer
//!
//! These tests verify the interaction between multiple components
//! against a real in-memory SQLite database.

pub mod batch_tests;
pub mod cache_tests;
pub mod storage_layer_tests;
pub mod transaction_tests;
