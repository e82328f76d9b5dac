//! Bounded retry with a fixed delay.
//!
//! The completion endpoint is retried at most `max_attempts` times with the
//! same pause between attempts: no exponential growth, no jitter. There is
//! no pause after the final attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Attempt budget and pause for a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub max_attempts: u32,
    /// Pause after each failed attempt that is not the last.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Every attempt failed; `errors` holds one entry per attempt, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    pub errors: Vec<E>,
}

impl<E> RetryExhausted<E> {
    pub fn attempts(&self) -> usize {
        self.errors.len()
    }

    pub fn last(&self) -> Option<&E> {
        self.errors.last()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-indexed attempt number. `label` only appears in
    /// log lines.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut errors = Vec::with_capacity(self.max_attempts as usize);

        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        "{}: attempt {}/{} failed: {}",
                        label, attempt, self.max_attempts, e
                    );
                    errors.push(e);
                }
            }
            if attempt < self.max_attempts {
                sleep(self.delay).await;
            }
        }

        Err(RetryExhausted { errors })
    }
}
