//! # clearsign-explorer
//!
//! Block-explorer access for the signature checker:
//!
//! - [`ExplorerApi`]: "get ABI" / "get source metadata", one round trip each
//! - [`EtherscanClient`]: the Etherscan v2 multichain implementation
//! - [`ProviderRegistry`]: which provider (and credential) serves a chain
//! - [`policy`]: the shared rate limiter and linear retry policy
//! - [`ExplorerClient`]: an API routed through that policy
//!
//! Time is injected through [`Clock`] so pacing can be tested without sleeping.

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod etherscan;
pub mod policy;
pub mod providers;

pub use api::{Endpoint, ExplorerApi, SourceMetadata};
pub use client::ExplorerClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ExplorerConfig, ProviderConfig};
pub use error::{ConfigError, ExplorerError};
pub use etherscan::EtherscanClient;
pub use policy::{RateLimiter, RateLimiterConfig, RetryConfig, RetryPolicy, Throttle};
pub use providers::ProviderRegistry;
