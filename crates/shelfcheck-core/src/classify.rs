//! Mapping observed lookup signals and failures onto an outcome status.

use serde::{Deserialize, Serialize};

use crate::OutcomeStatus;

/// What the search page showed once the bounded wait finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// At least one result element was present.
    pub results: bool,
    /// The "no results" marker was present.
    pub empty: bool,
}

impl Signal {
    pub fn results() -> Self {
        Self {
            results: true,
            empty: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            results: false,
            empty: true,
        }
    }

    pub fn neither() -> Self {
        Self::default()
    }
}

/// Failure categories a lookup step can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A handle went stale and stayed stale through every retry.
    StaleReference,
    /// A bounded wait expired.
    LookupTimeout,
    /// No session could be established.
    SessionFailure,
    /// Anything else.
    Unanticipated,
}

/// Classify one lookup.
///
/// Results take precedence over the no-results marker when both are visible.
pub fn classify(observed: Result<Signal, FailureKind>) -> OutcomeStatus {
    match observed {
        Ok(Signal { results: true, .. }) => OutcomeStatus::Available,
        Ok(Signal { empty: true, .. }) => OutcomeStatus::NotFound,
        Ok(Signal { .. }) => OutcomeStatus::Error,
        Err(FailureKind::LookupTimeout) => OutcomeStatus::Timeout,
        Err(FailureKind::StaleReference | FailureKind::SessionFailure) => OutcomeStatus::Stale,
        Err(FailureKind::Unanticipated) => OutcomeStatus::Error,
    }
}
