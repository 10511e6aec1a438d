//! Error handling for the data layer
//!
//! This module defines the crate-wide error type, the wrapped transaction error
//! and the closed set of transaction failure kinds used for retry decisions.

mod classify;
mod helpers;
mod types;

pub use types::{DataError, DatabaseError, Result, TransactionErrorKind};
