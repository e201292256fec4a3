//! Runner configuration.

use std::time::Duration;

use thiserror::Error;

use crate::retry::RetryPolicy;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Retry budget must allow at least one attempt, got {0}")]
    InvalidRetryBudget(u32),

    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
}

/// Per-task lookup policy shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Search entry point each session navigates to.
    pub search_url: String,

    /// Selector of the query input.
    pub input_selector: String,

    /// Selector matching one search result.
    pub results_selector: String,

    /// Selector of the "no results" marker.
    pub empty_selector: String,

    /// Bounded wait for the input and for the results.
    pub wait_timeout: Duration,

    /// Delay after each task, whatever its outcome.
    pub pacing_delay: Duration,

    /// Retry policy for clearing and submitting the query.
    pub retry: RetryPolicy,
}

impl RunnerConfig {
    /// Create a config for a search page with default selectors and policy.
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
            ..Self::default()
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            search_url: String::new(),
            input_selector: "div.panel-busqueda input#buscar".to_string(),
            results_selector: "div.producto".to_string(),
            empty_selector: "span.sin-resultados-busqueda-avanzada".to_string(),
            wait_timeout: Duration::from_secs(60),
            pacing_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}
