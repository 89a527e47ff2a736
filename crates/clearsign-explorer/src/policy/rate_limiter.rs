//! Minimum-interval rate limiter.
//!
//! Block explorers publish their limits as "N calls per second", so pacing is
//! modelled as a minimum gap between request starts rather than a bucket. Each
//! caller reserves the next free slot (`max(now, previous + interval)`) under
//! the lock and then sleeps until it, so concurrent callers never share a slot.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::clock::Clock;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Minimum time between the start of two requests.
    pub min_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(250), // Etherscan free tier: 5 calls/s
        }
    }
}

/// Shared request pacer. One instance is owned per run and handed to every client.
pub struct RateLimiter {
    config: RateLimiterConfig,
    next_slot: Mutex<Option<Duration>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            next_slot: Mutex::new(None),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn min_interval(&self) -> Duration {
        self.config.min_interval
    }

    /// Time the next caller would have to wait.
    pub fn wait_time(&self) -> Duration {
        let next = *self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        next.map(|slot| slot.saturating_sub(self.clock.now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Reserve the next slot and wait for it. Returns how long the caller slept.
    pub async fn acquire(&self) -> Duration {
        let wait = {
            let mut next = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let now = self.clock.now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.config.min_interval);
            slot - now
        };

        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limited, backing off");
            self.clock.sleep(wait).await;
        }
        wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(ms: u64) -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::new());
        let rl = RateLimiter::new(
            RateLimiterConfig {
                min_interval: Duration::from_millis(ms),
            },
            clock.clone(),
        );
        (clock, rl)
    }

    #[tokio::test]
    async fn first_request_is_free() {
        let (_, rl) = limiter(200);
        assert_eq!(rl.acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn back_to_back_requests_are_spaced() {
        let (clock, rl) = limiter(200);
        let mut starts = Vec::new();
        for _ in 0..4 {
            rl.acquire().await;
            starts.push(clock.now());
        }
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(200), "{starts:?}");
        }
    }

    #[tokio::test]
    async fn idle_time_counts_towards_interval() {
        let (clock, rl) = limiter(200);
        rl.acquire().await;
        clock.advance(Duration::from_millis(150));
        assert_eq!(rl.wait_time(), Duration::from_millis(50));
        assert_eq!(rl.acquire().await, Duration::from_millis(50));

        clock.advance(Duration::from_secs(1));
        assert_eq!(rl.acquire().await, Duration::ZERO);
    }
}
