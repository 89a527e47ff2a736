//! Etherscan v2 multichain API client.
//!
//! One key serves every chain in [`ETHERSCAN_V2_CHAINS`]; the chain is picked
//! with the `chainid` query parameter:
//!
//! ```text
//! GET https://api.etherscan.io/v2/api?chainid=1&module=contract&action=getabi&address=0x…&apikey=…
//! ```
//!
//! Responses share one envelope, `{"status": "1"|"0", "message": …, "result": …}`.
//! On failure `result` carries the human-readable reason, which is how rate
//! limiting and unverified contracts are told apart from other errors.

use alloy_primitives::Address;
use async_trait::async_trait;
use clearsign_core::chain::ETHERSCAN_V2_CHAINS;
use clearsign_core::{parse_abi, AbiFunction};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use crate::api::{Endpoint, ExplorerApi, SourceMetadata};
use crate::config::ProviderConfig;
use crate::error::{ConfigError, ExplorerError};

pub const ETHERSCAN_V2_URL: &str = "https://api.etherscan.io/v2/api";
pub const ETHERSCAN_KEY_ENV: &str = "ETHERSCAN_API_KEY";

/// The provider used when no configuration file is given.
pub fn default_provider() -> ProviderConfig {
    ProviderConfig {
        name: "etherscan".into(),
        base_url: ETHERSCAN_V2_URL.into(),
        api_key_env: Some(ETHERSCAN_KEY_ENV.into()),
        api_key: None,
        chains: ETHERSCAN_V2_CHAINS.to_vec(),
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SourceRecord {
    #[serde(default, rename = "ABI")]
    abi: String,
    #[serde(default)]
    contract_name: String,
    #[serde(default)]
    proxy: String,
    #[serde(default)]
    implementation: String,
}

const UNVERIFIED: &str = "Contract source code not verified";

// ─── Client ──────────────────────────────────────────────────────────────────

/// HTTP client for Etherscan-compatible v2 endpoints.
pub struct EtherscanClient {
    http: Client,
    timeout: Duration,
}

impl EtherscanClient {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("clearsign/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    async fn call(
        &self,
        endpoint: &Endpoint,
        action: &str,
        address: &str,
    ) -> Result<Envelope, ExplorerError> {
        let chain_id = endpoint.chain_id.to_string();
        let resp = self
            .http
            .get(&endpoint.base_url)
            .query(&[
                ("chainid", chain_id.as_str()),
                ("module", "contract"),
                ("action", action),
                ("address", address),
                ("apikey", endpoint.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(ExplorerError::RateLimited {
                provider: endpoint.provider.clone(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExplorerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn transport_error(&self, e: reqwest::Error) -> ExplorerError {
        if e.is_timeout() {
            ExplorerError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }
        } else {
            ExplorerError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl ExplorerApi for EtherscanClient {
    async fn source_metadata(
        &self,
        endpoint: &Endpoint,
        address: &str,
    ) -> Result<SourceMetadata, ExplorerError> {
        let envelope = self.call(endpoint, "getsourcecode", address).await?;
        source_from_envelope(envelope, endpoint, address)
    }

    async fn contract_abi(
        &self,
        endpoint: &Endpoint,
        address: &str,
    ) -> Result<Vec<AbiFunction>, ExplorerError> {
        let envelope = self.call(endpoint, "getabi", address).await?;
        abi_from_envelope(envelope, endpoint, address)
    }
}

// ─── Response mapping ────────────────────────────────────────────────────────

fn failure(envelope: &Envelope, endpoint: &Endpoint, address: &str) -> ExplorerError {
    let reason = envelope
        .result
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(envelope.message.as_str())
        .to_string();
    let lower = reason.to_ascii_lowercase();

    if lower.contains("rate limit") {
        ExplorerError::RateLimited {
            provider: endpoint.provider.clone(),
        }
    } else if lower.contains("not verified") {
        ExplorerError::NotVerified {
            chain_id: endpoint.chain_id,
            address: address.to_string(),
        }
    } else {
        ExplorerError::Api {
            provider: endpoint.provider.clone(),
            message: reason,
        }
    }
}

fn abi_from_envelope(
    envelope: Envelope,
    endpoint: &Endpoint,
    address: &str,
) -> Result<Vec<AbiFunction>, ExplorerError> {
    if envelope.status != "1" {
        return Err(failure(&envelope, endpoint, address));
    }
    // `result` is the ABI as an embedded JSON string.
    let text = envelope
        .result
        .as_str()
        .ok_or_else(|| ExplorerError::InvalidResponse {
            provider: endpoint.provider.clone(),
            reason: "getabi result is not a string".into(),
        })?;
    let abi: Value = serde_json::from_str(text).map_err(|e| ExplorerError::InvalidResponse {
        provider: endpoint.provider.clone(),
        reason: e.to_string(),
    })?;
    Ok(parse_abi(&abi))
}

fn source_from_envelope(
    envelope: Envelope,
    endpoint: &Endpoint,
    address: &str,
) -> Result<SourceMetadata, ExplorerError> {
    if envelope.status != "1" {
        return Err(failure(&envelope, endpoint, address));
    }
    let record = envelope
        .result
        .as_array()
        .and_then(|records| records.first())
        .cloned()
        .map(serde_json::from_value::<SourceRecord>)
        .transpose()?
        .ok_or_else(|| ExplorerError::InvalidResponse {
            provider: endpoint.provider.clone(),
            reason: "getsourcecode returned no records".into(),
        })?;

    if record.abi == UNVERIFIED {
        return Ok(SourceMetadata::default());
    }

    // A garbled implementation leaves the proxy itself to be checked.
    let (implementation, implementation_error) = match record.implementation.trim() {
        "" => (None, None),
        addr => match Address::from_str(addr) {
            Ok(address) => (Some(address), None),
            Err(e) => {
                tracing::warn!(%address, implementation = addr, error = %e, "unparseable implementation address");
                (None, Some(format!("bad implementation address {addr:?}: {e}")))
            }
        },
    };
    Ok(SourceMetadata {
        contract_name: Some(record.contract_name).filter(|n| !n.is_empty()),
        proxy: record.proxy == "1",
        implementation,
        implementation_error,
    })
}
