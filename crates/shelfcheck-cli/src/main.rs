//! shelfcheck - check catalogue availability of a list of items.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use shelfcheck_core::Report;
use shelfcheck_runner::{PoolError, TaskExecutor, WebhookNotifier};
use shelfcheck_webdriver::WebDriverClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod args;

use args::Args;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let tasks = args.task_set()?;
    let pool = args.pool()?;
    let config = Arc::new(args.runner_config()?);

    let lookup = Arc::new(WebDriverClient::new(args.webdriver_config()));
    let notifier = Arc::new(WebhookNotifier::new(args.slack_webhook_url.clone()));
    let executor = Arc::new(TaskExecutor::new(lookup, notifier, config));

    println!(
        "Checking {} items with {} concurrent sessions...",
        tasks.len(),
        pool.workers()
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for in-flight lookups to finish");
            on_signal.cancel();
        }
    });

    let report = match pool.run_until_cancelled(executor, tasks, cancel).await {
        Ok(report) => report,
        Err(e @ PoolError::Cancelled { .. }) => {
            error!(error = %e, "Run aborted");
            return Ok(ExitCode::from(130));
        }
    };

    println!("All searches completed!");
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    info!(
        run_id = %report.run_id,
        items = report.len(),
        failures = report.outcomes().iter().filter(|o| o.status.is_failure()).count(),
        "Run finished"
    );

    if args.strict && report.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &Report) {
    for line in report_lines(report) {
        println!("{line}");
    }
}

/// Text report lines. Queries are left out so the output can be shared.
fn report_lines(report: &Report) -> Vec<String> {
    report
        .outcomes()
        .iter()
        .map(|o| format!("Item #{}: {}", o.position, o.status))
        .collect()
}
