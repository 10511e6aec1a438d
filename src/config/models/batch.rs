//! Batch query configuration

use crate::storage::database::BatchOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults for `execute_batch_queries`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Operations in flight at once
    #[serde(default = "default_batch_concurrency")]
    pub concurrency: usize,
    /// Per-operation timeout in milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_batch_concurrency() -> usize {
    5
}

fn default_batch_timeout_ms() -> u64 {
    10_000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_batch_concurrency(),
            timeout_ms: default_batch_timeout_ms(),
        }
    }
}

impl BatchConfig {
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            concurrency: self.concurrency,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
