//! Retry policies for request initiation.
//!
//! Retries wrap the call that returns a response or a stream handle. Once a
//! stream is open, chunk-level failures are never retried: the consumer has
//! already observed part of the answer.

use crate::transport::http::is_retryable_status;
use crate::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use tokio::time::Duration;
use tracing::warn;

/// Configuration for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

#[async_trait]
pub trait RetryPolicy: Send + Sync {
    /// Delay before the next attempt, or `None` to give up.
    ///
    /// `attempt` is 0-based (first failure => attempt=0).
    async fn should_retry(&self, attempt: u32, error: &Error) -> Option<Duration>;
}

/// Exponential backoff over transport failures and retryable HTTP statuses.
#[derive(Debug, Clone, Default)]
pub struct ExponentialBackoff {
    config: RetryConfig,
}

impl ExponentialBackoff {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// min_delay * 2^attempt, capped at max_delay
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.min_delay.as_millis() as u64;
        let cap = self.config.max_delay.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(base.saturating_mul(factor).min(cap))
    }
}

#[async_trait]
impl RetryPolicy for ExponentialBackoff {
    async fn should_retry(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if attempt >= self.config.max_retries {
            return None;
        }
        let retryable = match error {
            Error::Remote { status, .. } => is_retryable_status(*status),
            other => other.is_retryable(),
        };
        retryable.then(|| self.backoff(attempt))
    }
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

#[async_trait]
impl RetryPolicy for NoRetry {
    async fn should_retry(&self, _attempt: u32, _error: &Error) -> Option<Duration> {
        None
    }
}

/// Run `op` until it succeeds or `policy` gives up; the last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(policy: &dyn RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => match policy.should_retry(attempt, &err).await {
                Some(delay) => {
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying provider request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(err),
            },
        }
    }
}
