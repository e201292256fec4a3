//! Outcome status taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified result of looking up one item. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The search returned at least one result.
    Available,
    /// The search page reported no results.
    NotFound,
    /// A bounded wait expired.
    Timeout,
    /// A stale handle survived every retry, or no session could be opened.
    Stale,
    /// Page structure did not match, or an unanticipated failure occurred.
    Error,
}

impl OutcomeStatus {
    /// All statuses, in report order.
    pub const ALL: [OutcomeStatus; 5] = [
        Self::Available,
        Self::NotFound,
        Self::Timeout,
        Self::Stale,
        Self::Error,
    ];

    /// Returns true if the lookup did not reach a definite answer.
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Available | Self::NotFound => false,
            Self::Timeout | Self::Stale | Self::Error => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::Stale => "stale",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
