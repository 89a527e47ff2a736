//! Request policy: every explorer call passes through the shared rate limiter
//! and the retry loop.
//!
//! ```text
//! call → [RateLimiter] → [ExplorerApi] ──retryable error──→ [RetryPolicy] ─┐
//!            ↑                                                             │
//!            └─────────────────────── sleep n × backoff ───────────────────┘
//! ```

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use retry::{RetryConfig, RetryPolicy};

use std::future::Future;
use std::sync::Arc;

use crate::error::ExplorerError;

/// Rate limiter plus retry policy, applied around a single logical request.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl Throttle {
    pub fn new(limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Self {
        Self { limiter, retry }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Run `op` until it succeeds, fails permanently or runs out of retries.
    /// Every attempt, retries included, waits for a rate-limiter slot.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ExplorerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExplorerError>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.limiter.acquire().await;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => match self.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            request = what,
                            "retrying request"
                        );
                        self.limiter.clock().sleep(delay).await;
                    }
                    None => {
                        tracing::error!(attempt, error = %e, request = what, "max retries exceeded");
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}
