//! The block-explorer interface the verifier depends on.

use alloy_primitives::Address;
use async_trait::async_trait;
use clearsign_core::AbiFunction;
use serde::Serialize;

use crate::error::ExplorerError;

/// A provider resolved for one chain, credential included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub provider: String,
    pub base_url: String,
    pub chain_id: u64,
    pub api_key: String,
}

/// Verified-source metadata for one address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub contract_name: Option<String>,
    /// The explorer flags the contract as a delegating proxy.
    pub proxy: bool,
    /// Implementation address reported for a proxy, if any.
    pub implementation: Option<Address>,
    /// Why a reported implementation could not be used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_error: Option<String>,
}

/// "Get ABI" and "get source metadata" against a block explorer.
///
/// Implementations perform a single HTTP round trip per call; pacing and
/// retries are applied by [`crate::ExplorerClient`].
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    async fn source_metadata(
        &self,
        endpoint: &Endpoint,
        address: &str,
    ) -> Result<SourceMetadata, ExplorerError>;

    async fn contract_abi(
        &self,
        endpoint: &Endpoint,
        address: &str,
    ) -> Result<Vec<AbiFunction>, ExplorerError>;
}
