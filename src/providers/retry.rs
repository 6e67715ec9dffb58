//! Retry policy for collaborator calls
//!
//! Exponential backoff with jitter: base → 2×base → 4×base → ... capped at
//! `max_delay_ms`, each delay jittered by ±`jitter_percent`. The default
//! policy makes a single attempt.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::errors::AppResult;
use crate::utils::constants::{
    DEFAULT_HTTP_MAX_ATTEMPTS, RETRY_BASE_DELAY_MS, RETRY_JITTER_PERCENT, RETRY_MAX_DELAY_MS,
    RETRY_MIN_DELAY_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_percent: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_delay_ms: RETRY_BASE_DELAY_MS,
            max_delay_ms: RETRY_MAX_DELAY_MS,
            jitter_percent: RETRY_JITTER_PERCENT,
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Un-jittered delay before retry number `retry` (1-based)
    pub fn base_delay(&self, retry: u32) -> u64 {
        let exp = retry.saturating_sub(1).min(32);
        self.base_delay_ms
            .saturating_mul(2_u64.saturating_pow(exp))
            .min(self.max_delay_ms)
    }

    /// Jittered delay before retry number `retry` (1-based)
    pub fn delay(&self, retry: u32) -> Duration {
        let capped = self.base_delay(retry);
        let jitter_range = (capped * self.jitter_percent) / 100;
        let jitter: i64 = if jitter_range == 0 {
            0
        } else {
            rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64))
        };
        let final_delay = (capped as i64 + jitter).max(RETRY_MIN_DELAY_MS as i64) as u64;
        Duration::from_millis(final_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. The last error is returned.
    pub async fn run<T, F, Fut>(&self, service: &str, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && e.code.is_retryable() => {
                    let delay = self.delay(attempt);
                    warn!(
                        service,
                        code = e.code_str(),
                        "⏳ Attempt {}/{} failed, retrying in {}ms",
                        attempt,
                        attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(service, attempt, "giving up: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
