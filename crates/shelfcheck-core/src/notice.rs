//! Human-readable messages for outcomes.
//!
//! Every message exists in two forms: a detailed one that names the query
//! (sent to the notification sink only) and an anonymized one that carries
//! the position alone (safe for shared logs).

use crate::{FailureKind, Item, OutcomeStatus};

/// Message selected for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    summary: &'static str,
    notify: bool,
}

impl Notice {
    /// Pick the message for a status and the failure that produced it, if any.
    pub fn describe(status: OutcomeStatus, cause: Option<FailureKind>) -> Self {
        let (summary, notify) = match (status, cause) {
            (OutcomeStatus::Available, _) => ("Item is available!", true),
            (OutcomeStatus::NotFound, _) => ("No results found.", false),
            (OutcomeStatus::Timeout, _) => ("Timed out waiting for search results to load.", true),
            (OutcomeStatus::Stale, Some(FailureKind::SessionFailure)) => {
                ("Lookup session could not be established.", true)
            }
            (OutcomeStatus::Stale, _) => {
                ("Stale element reference on input or results.", true)
            }
            (OutcomeStatus::Error, Some(FailureKind::Unanticipated)) => {
                ("Unexpected failure during lookup.", false)
            }
            (OutcomeStatus::Error, _) => (
                "Search results unavailable or page structure changed.",
                true,
            ),
        };
        Self { summary, notify }
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Whether this outcome should be pushed to the notification sink.
    pub fn should_notify(&self) -> bool {
        self.notify
    }

    /// Full message including the query, e.g. `#4 'Moby Dick' - Timed out ...`.
    pub fn detailed(&self, item: &Item) -> String {
        format!("#{} '{}' - {}", item.position(), item.query(), self.summary)
    }

    /// Position-only message, e.g. `Item #4 - Timed out ...`.
    pub fn anonymized(&self, item: &Item) -> String {
        format!("Item #{} - {}", item.position(), self.summary)
    }
}
