//! Command line arguments.

use std::time::Duration;

use clap::builder::TypedValueParser;
use clap::Parser;
use shelfcheck_core::{CoreError, TaskSet};
use shelfcheck_runner::{ConfigError, RetryPolicy, RunnerConfig, WorkerPool};
use shelfcheck_webdriver::WebDriverConfig;
use thiserror::Error;

/// Check catalogue availability of a list of items and notify a webhook
#[derive(Debug, Parser)]
#[command(name = "shelfcheck")]
#[command(about = "Check book availability and notify Slack", long_about = None)]
pub struct Args {
    /// Semicolon-separated list of items to check, e.g. "Book1; Book Number2; Book3"
    #[arg(
        long,
        env = "SHELFCHECK_BOOK_LIST",
        default_value = "Robinson Crusoe; Amin Maalouf; Dr. Seuss"
    )]
    pub book_list: String,

    /// Webhook URL for sending notifications
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: String,

    /// Search page to look items up on
    #[arg(long, env = "WEBSITE_URL")]
    pub website_url: String,

    /// Number of concurrent browser sessions
    #[arg(
        long,
        default_value_t = WorkerPool::DEFAULT_WORKERS,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub max_workers: usize,

    /// WebDriver endpoint (chromedriver, geckodriver, Selenium)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// CSS selector of the search input
    #[arg(long, default_value = "div.panel-busqueda input#buscar")]
    pub input_selector: String,

    /// CSS selector matching one search result
    #[arg(long, default_value = "div.producto")]
    pub results_selector: String,

    /// CSS selector of the "no results" marker
    #[arg(long, default_value = "span.sin-resultados-busqueda-avanzada")]
    pub empty_selector: String,

    /// Seconds to wait for the search input and for results
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Seconds to pause after each item
    #[arg(long, default_value_t = 1)]
    pub pacing_secs: u64,

    /// Attempts for clearing and typing into the search input
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Print the report as JSON. Unlike the text report, this includes each
    /// item's query string.
    #[arg(long)]
    pub json: bool,

    /// Exit with status 1 if any item timed out, went stale or errored
    #[arg(long)]
    pub strict: bool,
}

/// Errors turning arguments into a run configuration.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Args {
    pub fn task_set(&self) -> Result<TaskSet, ArgsError> {
        Ok(TaskSet::parse(&self.book_list)?)
    }

    pub fn runner_config(&self) -> Result<RunnerConfig, ArgsError> {
        Ok(RunnerConfig {
            search_url: self.website_url.clone(),
            input_selector: self.input_selector.clone(),
            results_selector: self.results_selector.clone(),
            empty_selector: self.empty_selector.clone(),
            wait_timeout: Duration::from_secs(self.timeout_secs),
            pacing_delay: Duration::from_secs(self.pacing_secs),
            retry: RetryPolicy::new(self.retries, RetryPolicy::default().backoff())?,
        })
    }

    pub fn webdriver_config(&self) -> WebDriverConfig {
        WebDriverConfig {
            headless: !self.headed,
            ..WebDriverConfig::new(self.webdriver_url.clone())
        }
    }

    pub fn pool(&self) -> Result<WorkerPool, ArgsError> {
        Ok(WorkerPool::new(self.max_workers)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 5] = [
        "shelfcheck",
        "--slack-webhook-url",
        "http://dummy",
        "--website-url",
        "http://example.com",
    ];

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(REQUIRED.iter().chain(extra).copied())
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.book_list, "Robinson Crusoe; Amin Maalouf; Dr. Seuss");
        assert_eq!(args.slack_webhook_url, "http://dummy");
        assert_eq!(args.website_url, "http://example.com");
        assert_eq!(args.max_workers, 2);
        assert!(!args.strict);

        let config = args.runner_config().unwrap();
        assert_eq!(config.wait_timeout, Duration::from_secs(60));
        assert_eq!(config.pacing_delay, Duration::from_secs(1));
        assert_eq!(config.retry.attempts(), 3);
        assert!(args.webdriver_config().headless);
    }

    #[test]
    fn test_custom_book_list() {
        let args = parse(&["--book-list", "Book A; Book B", "--max-workers", "3"]).unwrap();
        assert_eq!(args.max_workers, 3);

        let tasks = args.task_set().unwrap();
        let queries: Vec<_> = tasks.iter().map(|i| i.query()).collect();
        assert_eq!(queries, vec!["Book A", "Book B"]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(parse(&["--max-workers", "0"]).is_err());
    }

    #[test]
    fn test_max_workers_parsed_as_count() {
        let args = parse(&["--max-workers", "1"]).unwrap();
        assert_eq!(args.pool().unwrap().workers(), 1);
        assert!(parse(&["--max-workers", "-2"]).is_err());
        assert!(parse(&["--max-workers", "lots"]).is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let args = parse(&["--retries", "0"]).unwrap();
        assert!(matches!(
            args.runner_config(),
            Err(ArgsError::Config(ConfigError::InvalidRetryBudget(0)))
        ));
    }

    #[test]
    fn test_headed_flag() {
        let args = parse(&["--headed"]).unwrap();
        assert!(!args.webdriver_config().headless);
    }
}
