//! Outcome and Report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Item, OutcomeStatus, RunId};

/// The classified result of processing one Item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Position of the item in the submitted task set.
    pub position: usize,

    /// The query that was looked up.
    pub query: String,

    /// Classified status.
    pub status: OutcomeStatus,
}

impl Outcome {
    /// Create an Outcome for an item.
    pub fn new(item: &Item, status: OutcomeStatus) -> Self {
        Self {
            position: item.position(),
            query: item.query().to_string(),
            status,
        }
    }
}

/// Final, position-ordered outcomes of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Run identifier.
    pub run_id: RunId,

    /// When dispatch started.
    pub started_at: DateTime<Utc>,

    /// When the last outcome was collected.
    pub finished_at: DateTime<Utc>,

    outcomes: Vec<Outcome>,
}

impl Report {
    /// Assemble a report; outcomes are sorted by position.
    pub fn new(run_id: RunId, started_at: DateTime<Utc>, mut outcomes: Vec<Outcome>) -> Self {
        outcomes.sort_by_key(|o| o.position);
        Self {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of outcomes with the given status.
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Returns true if any lookup ended in Timeout, Stale or Error.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.status.is_failure())
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(position: usize, query: &str, status: OutcomeStatus) -> Outcome {
        Outcome::new(&Item::new(position, query).unwrap(), status)
    }

    #[test]
    fn test_report_sorts_by_position() {
        let report = Report::new(
            RunId::generate(),
            Utc::now(),
            vec![
                outcome(3, "Beta", OutcomeStatus::Available),
                outcome(1, "Zeta", OutcomeStatus::Available),
                outcome(2, "Alpha", OutcomeStatus::NotFound),
            ],
        );
        let positions: Vec<_> = report.outcomes().iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(report.count(OutcomeStatus::Available), 2);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_has_failures() {
        let report = Report::new(
            RunId::generate(),
            Utc::now(),
            vec![
                outcome(1, "A", OutcomeStatus::Available),
                outcome(2, "B", OutcomeStatus::Timeout),
            ],
        );
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_json_shape() {
        let run_id = RunId::generate();
        let report = Report::new(
            run_id,
            Utc::now(),
            vec![outcome(1, "Dune", OutcomeStatus::NotFound)],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["run_id"], run_id.to_string());
        assert_eq!(json["outcomes"][0]["status"], "not_found");
        assert_eq!(json["outcomes"][0]["query"], "Dune");
    }
}
