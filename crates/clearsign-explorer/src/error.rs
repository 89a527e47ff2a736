//! Explorer and configuration error types.

use thiserror::Error;

/// Errors raised while talking to a block explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Connection refused, DNS failure, TLS error, …
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The explorer refused the call because of its own rate limit.
    #[error("rate limit exceeded (provider: {provider})")]
    RateLimited { provider: String },

    /// No verified source or ABI is published for the address.
    #[error("contract {address} is not verified on chain {chain_id}")]
    NotVerified { chain_id: u64, address: String },

    /// The explorer answered with an application-level error.
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// The response body did not have the expected shape.
    #[error("invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl ExplorerError {
    /// Returns `true` if this error is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Configuration problems. These are detected before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no explorer provider supports chain {chain_id}")]
    UnsupportedChain { chain_id: u64 },

    #[error("provider {provider} has no credential for chain {chain_id} (set {env})")]
    MissingCredential {
        provider: String,
        chain_id: u64,
        env: String,
    },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
