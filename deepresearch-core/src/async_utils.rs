//! Async utilities and patterns
//!
//! Bounded retry with backoff

use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, warn};

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one. 1 disables retrying.
    pub max_attempts: usize,
    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
    /// Backoff multiplier (exponential backoff)
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    fn next_delay(&self, delay: u64) -> u64 {
        (((delay as f64) * self.backoff_multiplier) as u64).min(self.max_delay_ms)
    }

    fn jittered(&self, delay: u64) -> u64 {
        if self.jitter {
            let jitter_factor = 0.1;
            let jitter = (fastrand::f64() - 0.5) * 2.0 * jitter_factor;
            ((delay as f64) * (1.0 + jitter)) as u64
        } else {
            delay
        }
    }
}

/// Retry an async operation with exponential backoff.
///
/// Only errors accepted by `should_retry` are retried; anything else is returned immediately.
pub async fn retry_async<F, Fut, T, E, P>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let mut delay = config.initial_delay_ms;

    loop {
        attempt += 1;

        debug!(
            operation = operation_name,
            attempt = attempt,
            max_attempts = max_attempts,
            "Attempting operation"
        );

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                if !should_retry(&error) {
                    return Err(error);
                }

                if attempt >= max_attempts {
                    if max_attempts > 1 {
                        error!(
                            operation = operation_name,
                            attempt = attempt,
                            error = %error,
                            "Operation failed after all retry attempts"
                        );
                    }
                    return Err(error);
                }

                let actual_delay = config.jittered(delay);
                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    delay_ms = actual_delay,
                    "Operation failed, retrying"
                );

                sleep(Duration::from_millis(actual_delay)).await;
                delay = config.next_delay(delay);
            }
        }
    }
}
