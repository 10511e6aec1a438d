//! Transaction execution
//!
//! A unit of work receives a shared handle to the open transaction and runs
//! under the transaction's timeout. Success commits; an error or a timeout
//! rolls back and surfaces as [`DataError::Database`] carrying the original
//! cause.
//!
//! [`TransactionManager`] additionally flattens nested calls: a unit of work
//! that calls back into the same manager from the same task joins the
//! transaction already open instead of beginning a new one.

use super::client::TransactionalClient;
use super::retry::{RetryPolicy, retry_with_owner};
use super::types::{TransactionOptions, TransactionPreset};
use crate::config::TransactionConfig;
use crate::utils::error::{DataError, DatabaseError, Result};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tracing::{debug, error};

/// Handle a unit of work receives
pub type TransactionHandle<C> = Arc<<C as TransactionalClient>::Transaction>;

/// A transaction open somewhere up the current task's call stack
#[derive(Clone)]
struct ActiveTransaction {
    owner: u64,
    handle: Arc<dyn Any + Send + Sync>,
}

tokio::task_local! {
    static ACTIVE_TRANSACTIONS: Vec<ActiveTransaction>;
}

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

fn active_transactions() -> Vec<ActiveTransaction> {
    ACTIVE_TRANSACTIONS
        .try_with(|stack| stack.clone())
        .unwrap_or_default()
}

/// Run `unit_of_work` in a new transaction
pub async fn execute_transaction<C, T, F, Fut>(
    client: &C,
    options: TransactionOptions,
    unit_of_work: F,
) -> Result<T>
where
    C: TransactionalClient,
    F: FnOnce(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    run_transaction(client, &options, None, unit_of_work).await
}

/// Run `unit_of_work` with the default options of a preset
pub async fn execute_preset_transaction<C, T, F, Fut>(
    client: &C,
    preset: TransactionPreset,
    unit_of_work: F,
) -> Result<T>
where
    C: TransactionalClient,
    F: FnOnce(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let options = TransactionConfig::default().options_for(preset);
    run_transaction(client, &options, None, unit_of_work).await
}

/// Read-only transaction with a 5 second timeout
pub async fn execute_read_only_transaction<C, T, F, Fut>(client: &C, unit_of_work: F) -> Result<T>
where
    C: TransactionalClient,
    F: FnOnce(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    execute_preset_transaction(client, TransactionPreset::ReadOnly, unit_of_work).await
}

/// Write transaction with a 10 second timeout
pub async fn execute_write_transaction<C, T, F, Fut>(client: &C, unit_of_work: F) -> Result<T>
where
    C: TransactionalClient,
    F: FnOnce(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    execute_preset_transaction(client, TransactionPreset::Write, unit_of_work).await
}

/// Batch transaction with a 30 second timeout
pub async fn execute_batch_transaction<C, T, F, Fut>(client: &C, unit_of_work: F) -> Result<T>
where
    C: TransactionalClient,
    F: FnOnce(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    execute_preset_transaction(client, TransactionPreset::Batch, unit_of_work).await
}

/// Begin, run, then commit or roll back
///
/// With an `owner`, the handle is published in the task-local stack so that
/// nested calls through the same manager can join it.
pub(crate) async fn run_transaction<C, T, F, Fut>(
    client: &C,
    options: &TransactionOptions,
    owner: Option<u64>,
    unit_of_work: F,
) -> Result<T>
where
    C: TransactionalClient,
    F: FnOnce(TransactionHandle<C>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if options.timeout.is_zero() {
        return Err(failure(
            options,
            DataError::validation("transaction timeout must be greater than zero"),
        ));
    }

    let started = Instant::now();
    let deadline = started + options.timeout;
    let timeout_ms = options.timeout.as_millis() as u64;
    debug!(
        timeout_ms,
        isolation = %options.isolation_level,
        read_only = options.read_only,
        "Beginning transaction"
    );

    let transaction = match client.begin(options).await {
        Ok(transaction) => transaction,
        Err(e) => return Err(failure(options, e)),
    };

    let handle = Arc::new(transaction);
    let work = unit_of_work(Arc::clone(&handle));
    let outcome = match owner {
        Some(owner) => {
            let mut stack = active_transactions();
            stack.push(ActiveTransaction {
                owner,
                handle: Arc::clone(&handle) as Arc<dyn Any + Send + Sync>,
            });
            tokio::time::timeout_at(deadline, ACTIVE_TRANSACTIONS.scope(stack, work)).await
        }
        None => tokio::time::timeout_at(deadline, work).await,
    };

    let result = match outcome {
        Ok(result) => result,
        Err(_) => Err(DataError::Database(DatabaseError::timeout(format!(
            "transaction did not complete within {}ms",
            timeout_ms
        )))),
    };

    let transaction = match Arc::try_unwrap(handle) {
        Ok(transaction) => transaction,
        Err(_) => {
            // Dropping the last outstanding handle rolls the transaction back
            let cause = match result {
                Err(e) => e,
                Ok(_) => DataError::internal("transaction handle outlived its unit of work"),
            };
            return Err(failure(options, cause));
        }
    };

    match result {
        // Commit shares the deadline; a commit cut short drops the transaction, which rolls it back
        Ok(value) => match tokio::time::timeout_at(deadline, client.commit(transaction)).await {
            Ok(Ok(())) => {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transaction committed"
                );
                Ok(value)
            }
            Ok(Err(e)) => Err(failure(options, e)),
            Err(_) => Err(failure(
                options,
                DataError::Database(DatabaseError::timeout(format!(
                    "transaction did not commit within {}ms",
                    timeout_ms
                ))),
            )),
        },
        Err(e) => {
            if let Err(rollback_error) = client.rollback(transaction).await {
                error!(error = %rollback_error, "Transaction rollback failed");
            }
            Err(failure(options, e))
        }
    }
}

fn failure(options: &TransactionOptions, cause: DataError) -> DataError {
    let err = DatabaseError::wrap(cause);
    error!(
        kind = %err.kind(),
        timeout_ms = options.timeout.as_millis() as u64,
        isolation = %options.isolation_level,
        error = %err,
        "Transaction failed"
    );
    DataError::Database(err)
}

/// Runs units of work against one client, flattening nested transactions
pub struct TransactionManager<C: TransactionalClient> {
    client: Arc<C>,
    config: TransactionConfig,
    id: u64,
}

impl<C: TransactionalClient> std::fmt::Debug for TransactionManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish()
    }
}

impl<C: TransactionalClient> TransactionManager<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self::with_config(client, TransactionConfig::default())
    }

    pub fn with_config(client: Arc<C>, config: TransactionConfig) -> Self {
        Self {
            client,
            config,
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Whether the current task is inside a transaction of this manager
    pub fn in_transaction(&self) -> bool {
        self.active_handle().is_some()
    }

    fn active_handle(&self) -> Option<TransactionHandle<C>> {
        active_transactions()
            .into_iter()
            .rev()
            .find(|active| active.owner == self.id)
            .and_then(|active| active.handle.downcast::<C::Transaction>().ok())
    }

    /// Run `unit_of_work` in a transaction, joining the enclosing one if any
    ///
    /// A joined unit of work inherits the outer transaction's options and
    /// timeout.
    pub async fn execute<T, F, Fut>(
        &self,
        options: TransactionOptions,
        unit_of_work: F,
    ) -> Result<T>
    where
        F: FnOnce(TransactionHandle<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(handle) = self.active_handle() {
            debug!("Joining enclosing transaction");
            return unit_of_work(handle).await;
        }
        run_transaction(self.client.as_ref(), &options, Some(self.id), unit_of_work).await
    }

    /// Run with the configured options of a preset
    pub async fn execute_preset<T, F, Fut>(
        &self,
        preset: TransactionPreset,
        unit_of_work: F,
    ) -> Result<T>
    where
        F: FnOnce(TransactionHandle<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute(self.config.options_for(preset), unit_of_work).await
    }

    pub async fn execute_read_only<T, F, Fut>(&self, unit_of_work: F) -> Result<T>
    where
        F: FnOnce(TransactionHandle<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_preset(TransactionPreset::ReadOnly, unit_of_work).await
    }

    pub async fn execute_write<T, F, Fut>(&self, unit_of_work: F) -> Result<T>
    where
        F: FnOnce(TransactionHandle<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_preset(TransactionPreset::Write, unit_of_work).await
    }

    pub async fn execute_batch<T, F, Fut>(&self, unit_of_work: F) -> Result<T>
    where
        F: FnOnce(TransactionHandle<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_preset(TransactionPreset::Batch, unit_of_work).await
    }

    /// Run in a fresh transaction per attempt, retrying transient failures
    ///
    /// Inside an enclosing transaction the unit of work runs once; retrying
    /// is left to whoever owns the outer transaction.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        options: TransactionOptions,
        mut unit_of_work: F,
    ) -> Result<T>
    where
        F: FnMut(TransactionHandle<C>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(handle) = self.active_handle() {
            debug!("Joining enclosing transaction, retries disabled");
            return unit_of_work(handle).await;
        }

        let policy = RetryPolicy::from_config(&self.config);
        retry_with_owner(self.client.as_ref(), &options, &policy, Some(self.id), unit_of_work).await
    }
}
