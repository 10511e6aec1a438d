//! Mapping errors onto transaction failure kinds
//!
//! Classification happens once, where the error enters the transaction layer.
//! Retry decisions downstream only look at the resulting
//! [`TransactionErrorKind`].

use super::types::{DataError, TransactionErrorKind};
use sea_orm::{ConnAcquireErr, DbErr, RuntimeErr};

/// SQLSTATE codes and driver messages that indicate a lock conflict
const DEADLOCK_MARKERS: &[&str] = &[
    "40p01",
    "40001",
    "deadlock",
    "could not serialize access",
    "database is locked",
    "database table is locked",
];

impl DataError {
    /// Classify this error for retry purposes
    pub fn transaction_kind(&self) -> TransactionErrorKind {
        match self {
            DataError::Timeout(_) => TransactionErrorKind::Timeout,
            DataError::Database(err) => err.kind(),
            DataError::Sql(err) => classify_db_err(err),
            _ => TransactionErrorKind::Other,
        }
    }

    /// Whether retrying the failed operation may succeed
    pub fn is_transient(&self) -> bool {
        self.transaction_kind().is_transient()
    }
}

pub(crate) fn classify_db_err(err: &DbErr) -> TransactionErrorKind {
    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => TransactionErrorKind::Timeout,
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => TransactionErrorKind::ConnectionLost,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            classify_runtime_err(runtime).unwrap_or_else(|| classify_message(err))
        }
        other => classify_message(other),
    }
}

/// Driver failures that mean the connection or pool went away mid-statement
#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn classify_runtime_err(err: &RuntimeErr) -> Option<TransactionErrorKind> {
    use sea_orm::sqlx;

    match err {
        RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut) => Some(TransactionErrorKind::Timeout),
        RuntimeErr::SqlxError(
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed,
        ) => Some(TransactionErrorKind::ConnectionLost),
        _ => None,
    }
}

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
fn classify_runtime_err(_err: &RuntimeErr) -> Option<TransactionErrorKind> {
    None
}

fn classify_message(err: &DbErr) -> TransactionErrorKind {
    let message = err.to_string().to_lowercase();
    if DEADLOCK_MARKERS.iter().any(|marker| message.contains(marker)) {
        TransactionErrorKind::Deadlock
    } else {
        TransactionErrorKind::Other
    }
}
