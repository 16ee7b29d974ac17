use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts.
///
/// Used for connection establishment at startup only; steady-state publishing
/// is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` below 1 is treated as a single attempt.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or attempts are exhausted.
    ///
    /// The operation receives the 1-based attempt number. The last error is
    /// returned once every attempt has failed.
    pub async fn run<T, E, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    tracing::error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %e,
                        "Giving up after exhausting retries"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Attempt failed, will retry"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
