//! Explorer calls routed through the shared request policy.

use clearsign_core::AbiFunction;

use crate::api::{Endpoint, ExplorerApi, SourceMetadata};
use crate::error::ExplorerError;
use crate::policy::Throttle;

/// An [`ExplorerApi`] paired with the run's throttle.
pub struct ExplorerClient<A> {
    api: A,
    throttle: Throttle,
}

impl<A: ExplorerApi> ExplorerClient<A> {
    pub fn new(api: A, throttle: Throttle) -> Self {
        Self { api, throttle }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    pub async fn source_metadata(
        &self,
        endpoint: &Endpoint,
        address: &str,
    ) -> Result<SourceMetadata, ExplorerError> {
        tracing::debug!(chain_id = endpoint.chain_id, address, "fetching source metadata");
        self.throttle
            .run("getsourcecode", || self.api.source_metadata(endpoint, address))
            .await
    }

    pub async fn contract_abi(
        &self,
        endpoint: &Endpoint,
        address: &str,
    ) -> Result<Vec<AbiFunction>, ExplorerError> {
        tracing::debug!(chain_id = endpoint.chain_id, address, "fetching ABI");
        self.throttle
            .run("getabi", || self.api.contract_abi(endpoint, address))
            .await
    }
}
