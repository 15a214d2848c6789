//! Retry classification and backoff schedule for forwarded calls.
//!
//! Classification is active; the policy itself is inert. Eligible failures
//! take the retry path but the default policy grants zero extra attempts, so
//! nothing is ever re-issued. Re-enabling it means auditing idempotency of
//! forwarded calls first.

use super::error::Error;
use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Never retried: 401, 403, 404, 500.
    Never,
    /// Eligible for retry: network failures, 502, 503, 504.
    Eligible,
}

#[must_use]
pub fn classify_status(status: StatusCode) -> RetryClass {
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            RetryClass::Eligible
        }
        _ => RetryClass::Never,
    }
}

#[must_use]
pub fn classify_error(err: &Error) -> RetryClass {
    match err {
        Error::Transient(_) => RetryClass::Eligible,
        _ => RetryClass::Never,
    }
}

/// Exponential backoff with jitter for eligible failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // max_attempts 0 keeps the policy inert: failures surface once.
        Self {
            max_attempts: 0,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before retry number `attempt` (0-based), or `None` when the
    /// budget is exhausted.
    #[must_use]
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let exp = 2u64.saturating_pow(attempt);
        let millis = u64::try_from(self.base_delay.as_millis())
            .unwrap_or(u64::MAX)
            .saturating_mul(exp);

        let mut rng = rand::thread_rng();
        let jittered = (millis as f64 * rng.gen_range(0.9..1.1)) as u64;

        Some(Duration::from_millis(jittered))
    }
}
