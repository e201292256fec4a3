//! Lookup interface the executor drives.
//!
//! A [`LookupClient`] hands out one [`LookupSession`] per task. Sessions are
//! never shared between tasks. Selectors are opaque strings owned by the
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use shelfcheck_core::{FailureKind, Signal};
use thiserror::Error;

/// Errors a lookup implementation can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// A handle to a page element is no longer attached. Safe to retry.
    #[error("stale element reference: {0}")]
    StaleReference(String),

    /// A bounded wait expired.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The session could not be created or is gone.
    #[error("session failure: {0}")]
    Session(String),

    /// The lookup endpoint answered with something unexpected.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The lookup endpoint could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl LookupError {
    /// Failure category used for classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::StaleReference(_) => FailureKind::StaleReference,
            Self::Timeout(_) => FailureKind::LookupTimeout,
            Self::Session(_) => FailureKind::SessionFailure,
            Self::Protocol(_) | Self::Transport(_) => FailureKind::Unanticipated,
        }
    }

    /// Returns true for the failure class the retry wrapper tolerates.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StaleReference(_))
    }
}

/// Opaque handle to the query input of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputHandle(String);

impl InputHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Source of lookup sessions.
#[async_trait]
pub trait LookupClient: Send + Sync + 'static {
    type Session: LookupSession;

    /// Open a fresh session scoped to one task.
    async fn open_session(&self) -> Result<Self::Session, LookupError>;
}

/// One exclusive connection to the lookup interface.
#[async_trait]
pub trait LookupSession: Send + Sync {
    /// Load the search entry point.
    async fn navigate(&self, url: &str) -> Result<(), LookupError>;

    /// Wait until the query input is usable.
    async fn find_input(&self, selector: &str, timeout: Duration)
        -> Result<InputHandle, LookupError>;

    /// Empty the input. Repeating it leaves the input empty.
    async fn clear_input(&self, input: &InputHandle) -> Result<(), LookupError>;

    /// Type the query into the input.
    async fn submit_text(&self, input: &InputHandle, text: &str) -> Result<(), LookupError>;

    /// Send the query-execution signal (Enter).
    async fn submit_query(&self, input: &InputHandle) -> Result<(), LookupError>;

    /// Wait until either results or the no-results marker is observable.
    async fn wait_for_results_or_empty(
        &self,
        results_selector: &str,
        empty_selector: &str,
        timeout: Duration,
    ) -> Result<Signal, LookupError>;

    /// Release the session.
    async fn close(&self) -> Result<(), LookupError>;
}
