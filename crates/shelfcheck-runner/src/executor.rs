//! Per-item lookup execution.
//!
//! One call to [`ItemExecutor::execute`] turns one [`Item`] into exactly one
//! [`Outcome`]. Failures stay inside: they are classified, reported to the
//! notifier when useful, and logged without the query string.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use shelfcheck_core::{classify, Item, Notice, Outcome, OutcomeStatus, Signal};
use tracing::{error, info, warn};

use crate::config::RunnerConfig;
use crate::lookup::{LookupClient, LookupError, LookupSession};
use crate::notify::Notifier;
use crate::retry::retry;

/// Something that can process one item. The pool runs one call per item.
#[async_trait]
pub trait ItemExecutor: Send + Sync + 'static {
    /// Process an item. Must not panic on item-local failures.
    async fn execute(&self, item: &Item) -> Outcome;
}

/// Runs the full search sequence for an item against a lookup client.
pub struct TaskExecutor<L, N> {
    lookup: Arc<L>,
    notifier: Arc<N>,
    config: Arc<RunnerConfig>,
}

impl<L, N> TaskExecutor<L, N>
where
    L: LookupClient,
    N: Notifier,
{
    /// Create a new executor.
    pub fn new(lookup: Arc<L>, notifier: Arc<N>, config: Arc<RunnerConfig>) -> Self {
        Self {
            lookup,
            notifier,
            config,
        }
    }

    /// Open a session, search, and close the session whatever happened.
    async fn run_lookup(&self, item: &Item) -> Result<Signal, LookupError> {
        let session = self.lookup.open_session().await?;

        let observed = AssertUnwindSafe(self.search(&session, item.query()))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(LookupError::Protocol("lookup panicked".to_string())));

        if let Err(e) = session.close().await {
            warn!(position = item.position(), error = %e, "Failed to close lookup session");
        }

        observed
    }

    async fn search(&self, session: &L::Session, query: &str) -> Result<Signal, LookupError> {
        let config = &self.config;

        session.navigate(&config.search_url).await?;

        let input = session
            .find_input(&config.input_selector, config.wait_timeout)
            .await?;

        retry(&config.retry, LookupError::is_transient, || {
            session.clear_input(&input)
        })
        .await?;
        retry(&config.retry, LookupError::is_transient, || {
            session.submit_text(&input, query)
        })
        .await?;
        retry(&config.retry, LookupError::is_transient, || {
            session.submit_query(&input)
        })
        .await?;

        session
            .wait_for_results_or_empty(
                &config.results_selector,
                &config.empty_selector,
                config.wait_timeout,
            )
            .await
    }
}

#[async_trait]
impl<L, N> ItemExecutor for TaskExecutor<L, N>
where
    L: LookupClient,
    N: Notifier,
{
    async fn execute(&self, item: &Item) -> Outcome {
        let position = item.position();
        info!(position, "Processing item");

        let observed = self.run_lookup(item).await;

        if let Err(LookupError::Protocol(ref e) | LookupError::Transport(ref e)) = observed {
            error!(position, error = %e, "Unexpected lookup failure");
        }

        let cause = observed.as_ref().err().map(LookupError::kind);
        let status = classify(observed.map_err(|e| e.kind()));
        let notice = Notice::describe(status, cause);

        match status {
            OutcomeStatus::Available | OutcomeStatus::NotFound => {
                info!(position, status = %status, "{}", notice.anonymized(item));
            }
            OutcomeStatus::Timeout | OutcomeStatus::Stale | OutcomeStatus::Error => {
                warn!(position, status = %status, "{}", notice.anonymized(item));
            }
        }

        if notice.should_notify() && !self.notifier.notify(&notice.detailed(item)).await {
            warn!(position, "Notification was not delivered");
        }

        // Pace requests so the remote site does not throttle or block us.
        tokio::time::sleep(self.config.pacing_delay).await;

        Outcome::new(item, status)
    }
}
