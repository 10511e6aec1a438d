//! Bounded-concurrency batch queries
//!
//! Queries run in consecutive chunks of `concurrency`; a chunk finishes
//! completely before the next starts. Each query has its own timeout. A
//! failed query leaves `None` in its slot and an entry in `errors`, and the
//! batch carries on.

use crate::utils::error::{DataError, Result};
use futures::future::{BoxFuture, join_all};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// A boxed query for batches of heterogeneous closures
pub type BatchQuery<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T>> + Send + 'a>;

/// Batch execution limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Queries in flight at once
    pub concurrency: usize,
    /// Timeout of each individual query
    pub timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout: Duration::from_millis(10_000),
        }
    }
}

/// Failure of one query in a batch
#[derive(Debug)]
pub struct BatchQueryError {
    /// Position of the query in the input
    pub index: usize,
    pub error: DataError,
}

/// Outcome of a batch, positionally aligned with the input
#[derive(Debug)]
pub struct BatchResults<T> {
    /// `Some` for every query that succeeded
    pub results: Vec<Option<T>>,
    /// One entry per failed query, in input order
    pub errors: Vec<BatchQueryError>,
}

impl<T> BatchResults<T> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether every query succeeded
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.results.get(index).and_then(Option::as_ref)
    }

    /// Indices of failed queries
    pub fn failed_indices(&self) -> Vec<usize> {
        self.errors.iter().map(|failure| failure.index).collect()
    }
}

/// Run `queries` with at most `options.concurrency` in flight
///
/// Never fails as a whole; inspect [`BatchResults::errors`].
pub async fn execute_batch_queries<T, F, Fut>(
    queries: Vec<F>,
    options: BatchOptions,
) -> BatchResults<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total = queries.len();
    let concurrency = options.concurrency.max(1);
    let timeout = options.timeout;

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut errors = Vec::new();

    let mut pending = queries.into_iter().enumerate();
    loop {
        let chunk: Vec<(usize, F)> = pending.by_ref().take(concurrency).collect();
        if chunk.is_empty() {
            break;
        }

        let outcomes = join_all(chunk.into_iter().map(|(index, query)| async move {
            (index, tokio::time::timeout(timeout, query()).await)
        }))
        .await;

        for (index, outcome) in outcomes {
            match outcome {
                Ok(Ok(value)) => results[index] = Some(value),
                Ok(Err(error)) => errors.push(BatchQueryError { index, error }),
                Err(_) => errors.push(BatchQueryError {
                    index,
                    error: DataError::timeout(format!(
                        "batch query {} did not complete within {}ms",
                        index,
                        timeout.as_millis()
                    )),
                }),
            }
        }
    }

    if errors.is_empty() {
        debug!(total, "Batch completed");
    } else {
        warn!(total, failed = errors.len(), "Batch completed with failures");
        for failure in &errors {
            debug!(index = failure.index, error = %failure.error, "Batch query failed");
        }
    }

    BatchResults { results, errors }
}

/// Batch runner with fixed limits
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchQueryExecutor {
    options: BatchOptions,
}

impl BatchQueryExecutor {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn options(&self) -> BatchOptions {
        self.options
    }

    pub async fn execute<T, F, Fut>(&self, queries: Vec<F>) -> BatchResults<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        execute_batch_queries(queries, self.options).await
    }
}
