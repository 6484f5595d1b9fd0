//! Retry Logic with Backoff
//!
//! Wraps wallet-service and merchant-backend calls. Every failure is
//! retried until the budget runs out; the last error is returned as-is.

use std::fmt::Display;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::types::WalletCreationConfig;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,
    /// Double the delay after every failed attempt
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            exponential: true,
        }
    }
}

impl From<&WalletCreationConfig> for RetryPolicy {
    fn from(config: &WalletCreationConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.retry_delay_ms,
            exponential: config.exponential_backoff,
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (zero-indexed): `D` fixed, `D * 2^attempt` exponential
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = if self.exponential {
            let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
            self.base_delay_ms.saturating_mul(factor)
        } else {
            self.base_delay_ms
        };
        Duration::from_millis(ms)
    }
}

/// Execute an async closure with retry logic.
///
/// Attempts run strictly one after another. If the final attempt fails its
/// error is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut f: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if attempt >= policy.max_retries {
                    if policy.max_retries > 0 {
                        warn!(
                            "[Retry] {} failed after {} attempts: {}",
                            operation_name,
                            attempt + 1,
                            err
                        );
                    }
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                debug!(
                    "[Retry] {} attempt {}/{} failed ({}), retrying in {}ms",
                    operation_name,
                    attempt + 1,
                    policy.max_retries + 1,
                    err,
                    delay.as_millis()
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
