//! Fixed-backoff retry for operations that can fail transiently.
//!
//! Only the failure class designated by the caller is retried. Anything
//! else is returned after the first attempt, without delay. When the budget
//! runs out the last transient error is returned as-is.
//!
//! Wrapped operations may run more than once, so they must be safe to
//! repeat (set a field, submit the same text).

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::config::ConfigError;

/// Attempt budget and fixed backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy. A budget of zero attempts is rejected.
    pub fn new(attempts: u32, backoff: Duration) -> Result<Self, ConfigError> {
        if attempts == 0 {
            return Err(ConfigError::InvalidRetryBudget(attempts));
        }
        Ok(Self { attempts, backoff })
    }

    /// Total attempts, including the first one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the attempt budget is spent.
pub async fn retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts && is_transient(&err) => {
                debug!(
                    attempt,
                    max_attempts = policy.attempts,
                    backoff_ms = policy.backoff.as_millis() as u64,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
