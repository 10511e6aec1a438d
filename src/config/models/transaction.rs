//! Transaction configuration

use crate::storage::database::{IsolationLevel, TransactionOptions, TransactionPreset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-preset transaction timeouts and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Read-only transaction timeout in milliseconds
    #[serde(default = "default_read_only_timeout_ms")]
    pub read_only_timeout_ms: u64,
    /// Generic write transaction timeout in milliseconds
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    /// User write timeout in milliseconds
    #[serde(default = "default_user_timeout_ms")]
    pub user_timeout_ms: u64,
    /// Problem write timeout in milliseconds
    #[serde(default = "default_problem_timeout_ms")]
    pub problem_timeout_ms: u64,
    /// Class write timeout in milliseconds
    #[serde(default = "default_class_timeout_ms")]
    pub class_timeout_ms: u64,
    /// Report generation timeout in milliseconds
    #[serde(default = "default_report_timeout_ms")]
    pub report_timeout_ms: u64,
    /// Statistics computation timeout in milliseconds
    #[serde(default = "default_stats_timeout_ms")]
    pub stats_timeout_ms: u64,
    /// Batch transaction timeout in milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
    /// Isolation level used by every preset
    #[serde(default)]
    pub default_isolation: IsolationLevel,
    /// Attempts made by `retry_transaction`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between retries in milliseconds; attempt `n` waits `n * delay`
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_read_only_timeout_ms() -> u64 {
    5_000
}

fn default_write_timeout_ms() -> u64 {
    10_000
}

fn default_user_timeout_ms() -> u64 {
    10_000
}

fn default_problem_timeout_ms() -> u64 {
    15_000
}

fn default_class_timeout_ms() -> u64 {
    15_000
}

fn default_report_timeout_ms() -> u64 {
    20_000
}

fn default_stats_timeout_ms() -> u64 {
    20_000
}

fn default_batch_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            read_only_timeout_ms: default_read_only_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            user_timeout_ms: default_user_timeout_ms(),
            problem_timeout_ms: default_problem_timeout_ms(),
            class_timeout_ms: default_class_timeout_ms(),
            report_timeout_ms: default_report_timeout_ms(),
            stats_timeout_ms: default_stats_timeout_ms(),
            batch_timeout_ms: default_batch_timeout_ms(),
            default_isolation: IsolationLevel::default(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl TransactionConfig {
    /// Timeout configured for a preset
    pub fn timeout_for(&self, preset: TransactionPreset) -> Duration {
        let ms = match preset {
            TransactionPreset::ReadOnly => self.read_only_timeout_ms,
            TransactionPreset::Write => self.write_timeout_ms,
            TransactionPreset::User => self.user_timeout_ms,
            TransactionPreset::Problem => self.problem_timeout_ms,
            TransactionPreset::Class => self.class_timeout_ms,
            TransactionPreset::Report => self.report_timeout_ms,
            TransactionPreset::Stats => self.stats_timeout_ms,
            TransactionPreset::Batch => self.batch_timeout_ms,
        };
        Duration::from_millis(ms)
    }

    /// Options for a preset under this configuration
    pub fn options_for(&self, preset: TransactionPreset) -> TransactionOptions {
        TransactionOptions {
            timeout: self.timeout_for(preset),
            isolation_level: self.default_isolation,
            read_only: preset.is_read_only(),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
