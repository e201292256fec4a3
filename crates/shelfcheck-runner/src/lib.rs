//! shelfcheck runner
//!
//! Runs one lookup per item across a bounded pool of workers and collects
//! the outcomes into a position-ordered report.
//!
//! - [`retry`]: fixed-backoff retry for transient failures
//! - [`executor`]: the per-item lookup sequence
//! - [`pool`]: bounded dispatch and collection
//! - [`aggregate`]: ordering and completeness of the report
//! - [`lookup`] / [`notify`]: the collaborators the executor talks to

pub mod aggregate;
pub mod config;
pub mod executor;
pub mod lookup;
pub mod notify;
pub mod pool;
pub mod retry;

pub use aggregate::Aggregator;
pub use config::{ConfigError, RunnerConfig};
pub use executor::{ItemExecutor, TaskExecutor};
pub use lookup::{InputHandle, LookupClient, LookupError, LookupSession};
pub use notify::{Notifier, WebhookNotifier};
pub use pool::{PoolError, WorkerPool};
pub use retry::{retry, RetryPolicy};
