//! Linear backoff retry policy.

use std::time::Duration;

/// Configuration for the retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_retries: u32,
    /// Delay unit; the n-th retry waits `n × backoff`.
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Stateless retry policy that computes the next delay given the attempt number.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the delay before the `attempt`-th retry (1-based).
    /// Returns `None` if `attempt` exceeds `max_retries`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || !self.should_retry(attempt) {
            return None;
        }
        Some(self.config.backoff * attempt)
    }

    /// Returns `true` if any retries remain after `attempt` failures.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.config.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        });
        assert_eq!(policy.next_delay(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(1000)));
        assert_eq!(policy.next_delay(3), Some(Duration::from_millis(1500)));
        assert!(policy.next_delay(4).is_none());
    }

    #[test]
    fn zero_retries_never_retries() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 0,
            ..Default::default()
        });
        assert!(!policy.should_retry(1));
        assert!(policy.next_delay(1).is_none());
    }
}
