//! The signature check.
//!
//! For every selected chain and every deployment address on it:
//!
//! ```text
//! source metadata → proxy resolution → ABI of the resolved address → AbiIndex
//!   → per format key: selector lookup (match) or fuzzy proposal (mismatch)
//! ```
//!
//! Requests are issued one at a time through the client's throttle. A failed
//! address keeps its error and the run continues with the next one.

use clearsign_core::{as_raw_selector, normalize, selector_of, AbiIndex, Descriptor, FuzzyMatcher};
use clearsign_explorer::{Endpoint, ExplorerApi, ExplorerClient, ExplorerError, ProviderRegistry};

use crate::error::VerifyError;
use crate::proxy::ProxyResolution;
use crate::report::{AddressReport, ChainReport, KeyMatch, Mismatch, Proposal, ValidationReport};
use crate::select::{plan_chains, ChainPlan, ChainSelection};

pub struct Validator<A> {
    client: ExplorerClient<A>,
    providers: ProviderRegistry,
}

impl<A: ExplorerApi> Validator<A> {
    pub fn new(client: ExplorerClient<A>, providers: ProviderRegistry) -> Self {
        Self { client, providers }
    }

    pub fn client(&self) -> &ExplorerClient<A> {
        &self.client
    }

    /// Check every format key of `descriptor` on the selected chains.
    ///
    /// Input and configuration errors are returned before any explorer call;
    /// explorer failures are recorded per address in the report.
    pub async fn validate(
        &self,
        descriptor: &Descriptor,
        selection: ChainSelection,
    ) -> Result<ValidationReport, VerifyError> {
        let contract = descriptor.contract()?;
        let plan = plan_chains(&contract.deployments, selection, &self.providers)?;
        let keys: Vec<&str> = descriptor.format_keys().collect();

        let mut report = ValidationReport::new(keys.len());
        for chain in plan {
            match chain {
                ChainPlan::Skip { chain_id, reason } => {
                    report.chains.push(ChainReport::skipped(chain_id, reason));
                }
                ChainPlan::Check(target) => {
                    tracing::info!(
                        chain_id = target.chain_id,
                        provider = %target.endpoint.provider,
                        addresses = target.addresses.len(),
                        "checking chain"
                    );
                    let mut addresses = Vec::with_capacity(target.addresses.len());
                    for address in &target.addresses {
                        addresses.push(self.check_address(&target.endpoint, address, &keys).await);
                    }
                    report
                        .chains
                        .push(ChainReport::validated(target.chain_id, addresses));
                }
            }
        }
        Ok(report)
    }

    async fn check_address(&self, endpoint: &Endpoint, address: &str, keys: &[&str]) -> AddressReport {
        let mut report = AddressReport::new(address);
        if let Err(e) = self.fill_address(endpoint, address, keys, &mut report).await {
            tracing::warn!(chain_id = endpoint.chain_id, address, error = %e, "address check failed");
            report.error = Some(e.to_string());
        }
        report
    }

    async fn fill_address(
        &self,
        endpoint: &Endpoint,
        address: &str,
        keys: &[&str],
        report: &mut AddressReport,
    ) -> Result<(), ExplorerError> {
        let metadata = self.client.source_metadata(endpoint, address).await?;
        report.proxy = ProxyResolution::from_metadata(&metadata);
        report.resolved_address = report.proxy.target(address);
        report.contract_name = metadata.contract_name;
        if report.proxy.is_proxy() {
            tracing::debug!(address, proxy = %report.proxy, "proxy detected");
        }

        let abi = self
            .client
            .contract_abi(endpoint, &report.resolved_address)
            .await?;
        let index = AbiIndex::new(abi);
        report.abi_functions = index.len();

        for key in keys {
            match check_key(&index, key) {
                Ok(m) => report.matches.push(m),
                Err(m) => report.mismatches.push(m),
            }
        }
        Ok(())
    }
}

/// Match one format key against the index.
///
/// Raw selectors are looked up as-is and never get a proposal; keys that do
/// not parse are mismatches without a selector or proposal.
pub fn check_key(index: &AbiIndex, key: &str) -> Result<KeyMatch, Mismatch> {
    if let Some(selector) = as_raw_selector(key) {
        return match index.by_selector(&selector).first() {
            Some(f) => Ok(KeyMatch {
                key: key.to_string(),
                selector,
                signature: f.signature.clone(),
            }),
            None => Err(Mismatch {
                key: key.to_string(),
                selector: Some(selector),
                proposal: None,
            }),
        };
    }

    let Some(normalized) = normalize(key) else {
        tracing::debug!(key, "unparseable format key");
        return Err(Mismatch {
            key: key.to_string(),
            selector: None,
            proposal: None,
        });
    };
    let selector = selector_of(&normalized);
    if let Some(f) = index.by_selector(&selector).first() {
        return Ok(KeyMatch {
            key: key.to_string(),
            selector,
            signature: f.signature.clone(),
        });
    }

    let proposal = FuzzyMatcher::new(index).best(key).map(|c| Proposal {
        signature: c.function.signature.clone(),
        selector: c.function.selector.clone(),
        score: c.score,
        confidence: c.confidence(),
    });
    Err(Mismatch {
        key: key.to_string(),
        selector: Some(selector),
        proposal,
    })
}
