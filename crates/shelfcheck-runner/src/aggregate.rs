//! Collects outcomes as they complete and restores submission order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use shelfcheck_core::{Outcome, OutcomeStatus, Report, RunId, TaskSet};
use tracing::{error, info, warn};

/// Accumulates outcomes for one task set.
#[derive(Debug)]
pub struct Aggregator {
    run_id: RunId,
    started_at: DateTime<Utc>,
    tasks: TaskSet,
    received: BTreeMap<usize, Outcome>,
}

impl Aggregator {
    /// Start collecting for a task set.
    pub fn new(run_id: RunId, tasks: TaskSet) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            tasks,
            received: BTreeMap::new(),
        }
    }

    /// Record one completed outcome. Returns false if it was ignored.
    pub fn record(&mut self, outcome: Outcome) -> bool {
        let position = outcome.position;

        if self.tasks.get(position).is_none() {
            warn!(position, "Ignoring outcome for unknown position");
            return false;
        }
        if self.received.contains_key(&position) {
            warn!(position, "Ignoring duplicate outcome");
            return false;
        }

        self.received.insert(position, outcome);
        info!(
            position,
            completed = self.received.len(),
            total = self.tasks.len(),
            "Item completed"
        );
        true
    }

    /// Number of outcomes recorded so far.
    pub fn completed(&self) -> usize {
        self.received.len()
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_complete(&self) -> bool {
        self.received.len() == self.tasks.len()
    }

    /// Produce the ordered report.
    ///
    /// Items that never reported are accounted for as `Error`.
    pub fn finish(mut self) -> Report {
        for item in self.tasks.iter() {
            if !self.received.contains_key(&item.position()) {
                error!(position = item.position(), "No outcome collected, recording error");
                self.received
                    .insert(item.position(), Outcome::new(item, OutcomeStatus::Error));
            }
        }

        Report::new(
            self.run_id,
            self.started_at,
            self.received.into_values().collect(),
        )
    }
}
