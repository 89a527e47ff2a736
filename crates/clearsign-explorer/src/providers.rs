//! Provider lookup per chain.
//!
//! A chain is *usable* when some configured provider serves it and that
//! provider has a credential. Credentials come from the environment (or an
//! inline key in the config) and are resolved once, when the registry is built.

use crate::api::Endpoint;
use crate::config::{ExplorerConfig, ProviderConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone)]
struct Provider {
    config: ProviderConfig,
    api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Build from config, reading credentials from the process environment.
    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self::with_env(config, |name| std::env::var(name).ok())
    }

    /// Build from config with an explicit environment lookup.
    pub fn with_env(config: &ExplorerConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|p| {
                let api_key = p
                    .api_key
                    .clone()
                    .or_else(|| p.api_key_env.as_deref().and_then(&env))
                    .filter(|k| !k.trim().is_empty());
                Provider {
                    config: p.clone(),
                    api_key,
                }
            })
            .collect();
        Self { providers }
    }

    /// The first provider serving `chain_id` that has a credential.
    pub fn endpoint(&self, chain_id: u64) -> Result<Endpoint, ConfigError> {
        let mut missing = None;
        for provider in self.providers.iter().filter(|p| p.config.supports(chain_id)) {
            match &provider.api_key {
                Some(key) => {
                    return Ok(Endpoint {
                        provider: provider.config.name.clone(),
                        base_url: provider.config.base_url.clone(),
                        chain_id,
                        api_key: key.clone(),
                    })
                }
                None => {
                    missing.get_or_insert(provider);
                }
            }
        }
        Err(match missing {
            Some(p) => ConfigError::MissingCredential {
                provider: p.config.name.clone(),
                chain_id,
                env: p
                    .config
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| "an api_key".to_string()),
            },
            None => ConfigError::UnsupportedChain { chain_id },
        })
    }

    pub fn is_usable(&self, chain_id: u64) -> bool {
        self.endpoint(chain_id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExplorerConfig {
        ExplorerConfig {
            providers: vec![
                ProviderConfig {
                    name: "etherscan".into(),
                    base_url: "https://api.etherscan.io/v2/api".into(),
                    api_key_env: Some("ETHERSCAN_API_KEY".into()),
                    api_key: None,
                    chains: vec![1, 10],
                },
                ProviderConfig {
                    name: "routescan".into(),
                    base_url: "https://api.routescan.io/v2/api".into(),
                    api_key_env: None,
                    api_key: Some("free".into()),
                    chains: vec![10, 43114],
                },
            ],
            ..ExplorerConfig::default()
        }
    }

    #[test]
    fn credential_from_env() {
        let registry = ProviderRegistry::with_env(&config(), |name| {
            (name == "ETHERSCAN_API_KEY").then(|| "KEY".to_string())
        });
        let endpoint = registry.endpoint(1).unwrap();
        assert_eq!(endpoint.provider, "etherscan");
        assert_eq!(endpoint.api_key, "KEY");
    }

    #[test]
    fn falls_through_to_provider_with_credential() {
        let registry = ProviderRegistry::with_env(&config(), |_| None);
        assert_eq!(registry.endpoint(10).unwrap().provider, "routescan");
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let registry = ProviderRegistry::with_env(&config(), |_| Some("  ".into()));
        match registry.endpoint(1) {
            Err(ConfigError::MissingCredential { provider, env, .. }) => {
                assert_eq!(provider, "etherscan");
                assert_eq!(env, "ETHERSCAN_API_KEY");
            }
            other => panic!("expected missing credential, got {other:?}"),
        }
        assert!(!registry.is_usable(1));
    }

    #[test]
    fn unknown_chain_is_unsupported() {
        let registry = ProviderRegistry::with_env(&config(), |_| Some("KEY".into()));
        assert!(matches!(
            registry.endpoint(999),
            Err(ConfigError::UnsupportedChain { chain_id: 999 })
        ));
    }
}
