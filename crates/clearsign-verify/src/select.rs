//! Which chains of a descriptor get checked.
//!
//! Selection runs before any network call, so configuration problems in
//! single-chain mode surface without touching the explorer.

use clearsign_core::{Deployment, DescriptorError};
use clearsign_explorer::{ConfigError, Endpoint, ProviderRegistry};

use crate::error::VerifyError;

/// Requested chain scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSelection {
    /// One chain: the requested one if usable, otherwise the first usable deployment chain.
    Single(Option<u64>),
    /// Every deployment chain; chains without a usable provider are skipped.
    All,
}

/// A chain ready to be checked.
#[derive(Debug, Clone)]
pub struct ChainTarget {
    pub chain_id: u64,
    pub endpoint: Endpoint,
    /// Deployment addresses on this chain, in declaration order.
    pub addresses: Vec<String>,
}

/// One selected chain.
#[derive(Debug, Clone)]
pub enum ChainPlan {
    Check(ChainTarget),
    Skip { chain_id: u64, reason: String },
}

/// Distinct chain ids in first-declaration order.
fn chain_ids(deployments: &[Deployment]) -> Vec<u64> {
    let mut ids = Vec::new();
    for d in deployments {
        if !ids.contains(&d.chain_id) {
            ids.push(d.chain_id);
        }
    }
    ids
}

fn target(chain_id: u64, endpoint: Endpoint, deployments: &[Deployment]) -> ChainTarget {
    ChainTarget {
        chain_id,
        endpoint,
        addresses: deployments
            .iter()
            .filter(|d| d.chain_id == chain_id)
            .map(|d| d.address.clone())
            .collect(),
    }
}

pub fn plan_chains(
    deployments: &[Deployment],
    selection: ChainSelection,
    providers: &ProviderRegistry,
) -> Result<Vec<ChainPlan>, VerifyError> {
    let ids = chain_ids(deployments);
    let Some(&first) = ids.first() else {
        return Err(DescriptorError::NoDeployments.into());
    };

    match selection {
        ChainSelection::Single(requested) => {
            let requested = requested.filter(|id| {
                let deployed = ids.contains(id);
                if !deployed {
                    tracing::warn!(chain_id = id, "requested chain has no deployment, falling back");
                }
                deployed
            });
            let chosen = requested
                .into_iter()
                .chain(ids.iter().copied())
                .find_map(|id| providers.endpoint(id).ok().map(|e| (id, e)));

            match chosen {
                Some((chain_id, endpoint)) => {
                    if requested.is_some_and(|r| r != chain_id) {
                        tracing::warn!(chain_id, "requested chain has no usable provider, falling back");
                    }
                    Ok(vec![ChainPlan::Check(target(chain_id, endpoint, deployments))])
                }
                None => {
                    let err = match providers.endpoint(first) {
                        Err(e) => e,
                        Ok(_) => ConfigError::UnsupportedChain { chain_id: first },
                    };
                    Err(err.into())
                }
            }
        }
        ChainSelection::All => Ok(ids
            .into_iter()
            .map(|chain_id| match providers.endpoint(chain_id) {
                Ok(endpoint) => ChainPlan::Check(target(chain_id, endpoint, deployments)),
                Err(e) => {
                    tracing::warn!(chain_id, error = %e, "skipping chain");
                    ChainPlan::Skip {
                        chain_id,
                        reason: e.to_string(),
                    }
                }
            })
            .collect()),
    }
}
