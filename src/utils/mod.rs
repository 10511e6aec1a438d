//! Utility modules for the data layer
//!
//! - **error**: Error types and transaction failure classification
//! - **logging**: Tracing subscriber initialisation

pub mod error;
pub mod logging;

pub use logging::init_logging;
