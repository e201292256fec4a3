//! Bounded worker pool.
//!
//! Items are dispatched in submission order, each holding one of `W`
//! semaphore permits for as long as its executor runs. Outcomes are drained
//! from the join set as they complete and fed to the [`Aggregator`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use shelfcheck_core::{Item, Outcome, OutcomeStatus, Report, RunId, TaskSet};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::aggregate::Aggregator;
use crate::config::ConfigError;
use crate::executor::ItemExecutor;

/// Pool errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("Run cancelled after {completed} of {total} items")]
    Cancelled { completed: usize, total: usize },
}

/// Runs one executor call per item with at most `workers` in flight.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Default concurrency budget.
    pub const DEFAULT_WORKERS: usize = 2;

    /// Create a pool. At least one worker is required.
    pub fn new(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(workers));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every item to completion and return the ordered report.
    pub async fn run<E: ItemExecutor>(&self, executor: Arc<E>, tasks: TaskSet) -> Report {
        let mut aggregator = Aggregator::new(RunId::generate(), tasks.clone());
        self.drive(executor, &tasks, &mut aggregator, None).await;
        aggregator.finish()
    }

    /// Like [`WorkerPool::run`], but stops dispatching once `cancel` fires.
    ///
    /// In-flight items still run to completion so their sessions are
    /// released before the cancellation is reported.
    pub async fn run_until_cancelled<E: ItemExecutor>(
        &self,
        executor: Arc<E>,
        tasks: TaskSet,
        cancel: CancellationToken,
    ) -> Result<Report, PoolError> {
        let mut aggregator = Aggregator::new(RunId::generate(), tasks.clone());
        let finished = self
            .drive(executor, &tasks, &mut aggregator, Some(&cancel))
            .await;

        if !finished {
            return Err(PoolError::Cancelled {
                completed: aggregator.completed(),
                total: aggregator.total(),
            });
        }
        Ok(aggregator.finish())
    }

    /// Dispatch and collect. Returns false if dispatch was cut short.
    async fn drive<E: ItemExecutor>(
        &self,
        executor: Arc<E>,
        tasks: &TaskSet,
        aggregator: &mut Aggregator,
        cancel: Option<&CancellationToken>,
    ) -> bool {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut join_set: JoinSet<Outcome> = JoinSet::new();
        let mut pending = tasks.iter();
        let mut next = pending.next();
        let mut cancelled = false;

        info!(
            items = tasks.len(),
            workers = self.workers,
            "Dispatching items"
        );

        loop {
            let dispatching = next.is_some() && !cancelled;

            tokio::select! {
                biased;

                Some(joined) = join_set.join_next() => match joined {
                    Ok(outcome) => {
                        aggregator.record(outcome);
                    }
                    Err(e) => {
                        error!(error = %e, "Worker task failed to join");
                    }
                },

                _ = wait_cancelled(cancel), if dispatching => {
                    warn!(
                        dispatched = aggregator.completed() + join_set.len(),
                        total = tasks.len(),
                        "Cancellation requested, draining in-flight items"
                    );
                    cancelled = true;
                }

                permit = Arc::clone(&semaphore).acquire_owned(), if dispatching => {
                    let Ok(permit) = permit else {
                        error!("Worker semaphore closed");
                        break;
                    };
                    let Some(item) = next.take() else {
                        continue;
                    };
                    let item = item.clone();
                    let executor = Arc::clone(&executor);
                    join_set.spawn(async move {
                        let _permit = permit;
                        guarded_execute(executor.as_ref(), item).await
                    });
                    next = pending.next();
                }

                else => break,
            }
        }

        !cancelled
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            workers: Self::DEFAULT_WORKERS,
        }
    }
}

async fn wait_cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Run the executor, turning a panic into an `Error` outcome for the item.
async fn guarded_execute<E: ItemExecutor + ?Sized>(executor: &E, item: Item) -> Outcome {
    match AssertUnwindSafe(executor.execute(&item)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            error!(position = item.position(), "Executor panicked");
            Outcome::new(&item, OutcomeStatus::Error)
        }
    }
}
