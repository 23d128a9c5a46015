//! Retry policy for establishing device sessions.
//!
//! Connection establishment is the only place the provider retries on its
//! own. Attempts are spaced linearly: `step`, then `2 * step`, and so on.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How many times to try, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, never less than one
    pub attempts: u32,
    /// Wait before the first retry; later waits grow by the same step
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

impl RetryPolicy {
    /// A single attempt
    pub fn once() -> Self {
        Self::linear(1, Duration::ZERO)
    }

    /// `attempts` tries in total, waiting `step`, `2*step`, ... in between
    pub fn linear(attempts: u32, step: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            step,
        }
    }

    /// Wait after the failed attempt number `failed` (0-indexed)
    pub fn delay_after(&self, failed: u32) -> Duration {
        self.step.saturating_mul(failed.saturating_add(1))
    }

    /// Run `operation` until it succeeds, the attempts run out, or it fails
    /// with an error `retryable` rejects. The last error is returned.
    pub async fn execute<F, Fut, T, E, P>(&self, mut operation: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut failed = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if failed > 0 {
                        debug!(attempt = failed + 1, "Succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(e) if retryable(&e) && failed + 1 < self.attempts => {
                    let delay = self.delay_after(failed);
                    warn!(
                        attempt = failed + 1,
                        of = self.attempts,
                        error = %e,
                        "Attempt failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
