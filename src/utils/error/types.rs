//! Error types for the data layer

use std::fmt;
use thiserror::Error;

/// Result type alias for the data layer
pub type Result<T> = std::result::Result<T, DataError>;

/// Main error type for the data layer
#[derive(Error, Debug)]
pub enum DataError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wrapped transaction failure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Raw SeaORM errors
    #[error("SQL error: {0}")]
    Sql(#[from] sea_orm::DbErr),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure category of a transaction
///
/// Only [`Timeout`](Self::Timeout), [`Deadlock`](Self::Deadlock) and
/// [`ConnectionLost`](Self::ConnectionLost) are considered transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionErrorKind {
    /// The unit of work or the connection acquisition ran out of time
    Timeout,
    /// Deadlock or serialization conflict detected by the database
    Deadlock,
    /// The connection to the database was lost or could not be acquired
    ConnectionLost,
    /// Any other failure (constraint violations, validation, bugs)
    Other,
}

impl TransactionErrorKind {
    /// Whether a failure of this kind may succeed when retried
    pub fn is_transient(self) -> bool {
        !matches!(self, Self::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Deadlock => "deadlock",
            Self::ConnectionLost => "connection",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TransactionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed transaction, carrying the original cause
#[derive(Error, Debug)]
#[error("Database transaction failed ({kind}): {message}")]
pub struct DatabaseError {
    kind: TransactionErrorKind,
    message: String,
    #[source]
    source: Option<Box<DataError>>,
}

impl DatabaseError {
    pub fn new(kind: TransactionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an arbitrary error, classifying it
    pub fn wrap(cause: DataError) -> Self {
        match cause {
            DataError::Database(inner) => inner,
            other => Self {
                kind: other.transaction_kind(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransactionErrorKind::Timeout, message)
    }

    pub fn deadlock(message: impl Into<String>) -> Self {
        Self::new(TransactionErrorKind::Deadlock, message)
    }

    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::new(TransactionErrorKind::ConnectionLost, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransactionErrorKind::Other, message)
    }

    pub fn kind(&self) -> TransactionErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original error, if this wraps one
    pub fn cause(&self) -> Option<&DataError> {
        self.source.as_deref()
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}
