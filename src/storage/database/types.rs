//! Transaction option types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Transaction isolation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    #[default]
    Serializable,
}

impl IsolationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "read_uncommitted",
            IsolationLevel::ReadCommitted => "read_committed",
            IsolationLevel::RepeatableRead => "repeatable_read",
            IsolationLevel::Serializable => "serializable",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<IsolationLevel> for sea_orm::IsolationLevel {
    fn from(level: IsolationLevel) -> Self {
        match level {
            IsolationLevel::ReadUncommitted => sea_orm::IsolationLevel::ReadUncommitted,
            IsolationLevel::ReadCommitted => sea_orm::IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead => sea_orm::IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable => sea_orm::IsolationLevel::Serializable,
        }
    }
}

/// How a single transaction runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Upper bound for the unit of work; exceeding it rolls back
    pub timeout: Duration,
    pub isolation_level: IsolationLevel,
    /// Open the transaction in read-only access mode
    pub read_only: bool,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            isolation_level: IsolationLevel::default(),
            read_only: false,
        }
    }
}

impl TransactionOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn with_isolation(mut self, isolation_level: IsolationLevel) -> Self {
        self.isolation_level = isolation_level;
        self
    }

    pub fn as_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Named transaction profiles
///
/// Timeouts per preset come from
/// [`TransactionConfig`](crate::config::TransactionConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionPreset {
    ReadOnly,
    Write,
    User,
    Problem,
    Class,
    Report,
    Stats,
    Batch,
}

impl TransactionPreset {
    pub fn is_read_only(self) -> bool {
        matches!(self, TransactionPreset::ReadOnly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionPreset::ReadOnly => "read_only",
            TransactionPreset::Write => "write",
            TransactionPreset::User => "user",
            TransactionPreset::Problem => "problem",
            TransactionPreset::Class => "class",
            TransactionPreset::Report => "report",
            TransactionPreset::Stats => "stats",
            TransactionPreset::Batch => "batch",
        }
    }
}

impl fmt::Display for TransactionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
