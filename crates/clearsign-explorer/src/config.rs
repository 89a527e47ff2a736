//! Explorer configuration.
//!
//! ```yaml
//! min_interval_ms: 250
//! max_retries: 3
//! backoff_ms: 1000
//! providers:
//!   - name: etherscan
//!     base_url: https://api.etherscan.io/v2/api
//!     api_key_env: ETHERSCAN_API_KEY
//!     chains: [1, 10, 137, 8453, 42161]
//! ```
//!
//! Every field has a default; an empty document yields [`ExplorerConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::etherscan;
use crate::policy::{RateLimiter, RateLimiterConfig, RetryConfig, RetryPolicy, Throttle};

/// One block-explorer provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Inline API key; takes precedence over `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Chain ids this provider serves.
    #[serde(default)]
    pub chains: Vec<u64>,
}

impl ProviderConfig {
    pub fn supports(&self, chain_id: u64) -> bool {
        self.chains.contains(&chain_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    /// Minimum gap between two requests, across all providers.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// The n-th retry waits `n × backoff_ms`.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![etherscan::default_provider()]
}

fn default_min_interval_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            min_interval_ms: default_min_interval_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ExplorerConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limiter(&self, clock: Arc<dyn Clock>) -> RateLimiter {
        RateLimiter::new(
            RateLimiterConfig {
                min_interval: Duration::from_millis(self.min_interval_ms),
            },
            clock,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.backoff_ms),
        })
    }

    /// The run-wide throttle: one rate limiter shared by every request.
    pub fn throttle(&self, clock: Arc<dyn Clock>) -> Throttle {
        Throttle::new(Arc::new(self.rate_limiter(clock)), self.retry_policy())
    }
}
