//! Retry with exponential backoff around fallible async calls.

use crate::clock::Clock;
use crate::errors::{AppError, Result};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Attempt budget and backoff schedule for one call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Market state reads: 3 attempts, 2s then 4s between them.
    pub const MARKET_FETCH: Self = Self {
        max_attempts: 3,
        initial_delay: Duration::from_secs(2),
        backoff_multiplier: 2.0,
    };

    /// Notification sends: 3 attempts, 1s then 2s between them.
    pub const NOTIFICATION: Self = Self {
        max_attempts: 3,
        initial_delay: Duration::from_secs(1),
        backoff_multiplier: 2.0,
    };

    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_multiplier: f64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(AppError::Config("retry max_attempts must be at least 1".into()));
        }
        if initial_delay.is_zero() {
            return Err(AppError::Config("retry initial_delay must be positive".into()));
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
            return Err(AppError::Config(format!(
                "retry backoff_multiplier must be >= 1, got {backoff_multiplier}"
            )));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
        })
    }

    /// Delay slept after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(exponent))
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is reached.
///
/// Every failure except the last is logged and followed by a sleep on `clock`;
/// the last error is returned to the caller unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    mut op: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                error!(label, attempts = max_attempts, error = %e, "[RETRY] giving up");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    label,
                    attempt,
                    max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    error = %e,
                    "[RETRY] attempt failed, backing off"
                );
                clock.sleep(delay).await;
            }
        }
    }
}
