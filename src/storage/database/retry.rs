//! Retry with linear backoff for transient failures
//!
//! Only failures classified as transient (timeout, deadlock, lost
//! connection) are retried. Attempt `n` that fails waits `n * base_delay`
//! before the next one.

use super::client::TransactionalClient;
use super::transaction::{TransactionHandle, run_transaction};
use super::types::TransactionOptions;
use crate::config::TransactionConfig;
use crate::utils::error::{DataError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Attempt limit and backoff base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Policy making at most `max_attempts` attempts (at least one)
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn from_config(config: &TransactionConfig) -> Self {
        Self::new(config.max_retries).with_base_delay(config.retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait after the `attempt`-th failure
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Decide what to do after `attempt` failed with `err`
    ///
    /// Returns the delay before the next attempt, or `None` to give up.
    fn next_delay(&self, err: &DataError, attempt: u32) -> Option<Duration> {
        if !err.is_transient() {
            debug!(attempt, error = %err, "Failure is not transient, not retrying");
            return None;
        }
        if attempt >= self.max_attempts {
            error!(attempts = attempt, error = %err, "Retries exhausted");
            return None;
        }

        let delay = self.delay_after(attempt);
        warn!(
            attempt,
            max_attempts = self.max_attempts,
            kind = %err.transaction_kind(),
            delay_ms = delay.as_millis() as u64,
            "Transient failure, retrying"
        );
        Some(delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => match self.next_delay(&err, attempt) {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => return Err(err),
                },
            }
        }
    }
}

/// Run `unit_of_work` in a fresh transaction per attempt
///
/// Returns the first success, the first non-transient failure, or the
/// failure of the last attempt.
pub async fn retry_transaction<C, T, F, Fut>(
    client: &C,
    options: TransactionOptions,
    policy: &RetryPolicy,
    unit_of_work: F,
) -> Result<T>
where
    C: TransactionalClient,
    F: FnMut(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_with_owner(client, &options, policy, None, unit_of_work).await
}

pub(crate) async fn retry_with_owner<C, T, F, Fut>(
    client: &C,
    options: &TransactionOptions,
    policy: &RetryPolicy,
    owner: Option<u64>,
    mut unit_of_work: F,
) -> Result<T>
where
    C: TransactionalClient,
    F: FnMut(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match run_transaction(client, options, owner, &mut unit_of_work).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Transaction succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => match policy.next_delay(&err, attempt) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(err),
            },
        }
    }
}
