//! Single-hop proxy resolution from explorer source metadata.

use alloy_primitives::Address;
use clearsign_explorer::SourceMetadata;
use serde::Serialize;

/// How the address whose ABI is checked was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProxyResolution {
    /// Not a proxy; the deployment address is checked directly.
    Direct,
    /// A proxy whose implementation is checked instead.
    ProxyResolved { implementation: Address },
    /// A proxy without a usable implementation; the proxy's own ABI is checked.
    ProxyUnresolved { reason: String },
}

impl ProxyResolution {
    pub fn from_metadata(metadata: &SourceMetadata) -> Self {
        if !metadata.proxy {
            return Self::Direct;
        }
        match metadata.implementation {
            Some(implementation) if !implementation.is_zero() => Self::ProxyResolved { implementation },
            Some(_) => Self::ProxyUnresolved {
                reason: "implementation address is zero".into(),
            },
            None => Self::ProxyUnresolved {
                reason: metadata
                    .implementation_error
                    .clone()
                    .unwrap_or_else(|| "explorer reports no implementation".into()),
            },
        }
    }

    /// The address to fetch the ABI from.
    pub fn target(&self, address: &str) -> String {
        match self {
            Self::ProxyResolved { implementation } => implementation.to_checksum(None),
            _ => address.to_string(),
        }
    }

    pub fn is_proxy(&self) -> bool {
        !matches!(self, Self::Direct)
    }
}

impl std::fmt::Display for ProxyResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::ProxyResolved { implementation } => write!(f, "proxy → {implementation}"),
            Self::ProxyUnresolved { reason } => write!(f, "proxy (unresolved: {reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const PROXY: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    fn meta(proxy: bool, implementation: Option<&str>) -> SourceMetadata {
        SourceMetadata {
            contract_name: None,
            proxy,
            implementation: implementation.map(|a| Address::from_str(a).unwrap()),
            implementation_error: None,
        }
    }

    #[test]
    fn plain_contract_is_direct() {
        let resolution = ProxyResolution::from_metadata(&meta(false, None));
        assert_eq!(resolution, ProxyResolution::Direct);
        assert_eq!(resolution.target(PROXY), PROXY);
        assert!(!resolution.is_proxy());
    }

    #[test]
    fn proxy_uses_implementation() {
        let resolution =
            ProxyResolution::from_metadata(&meta(true, Some("0x43506849d7c04f9138d1a2050bbf3a0c054402dd")));
        assert!(matches!(resolution, ProxyResolution::ProxyResolved { .. }));
        assert_eq!(
            resolution.target(PROXY).to_lowercase(),
            "0x43506849d7c04f9138d1a2050bbf3a0c054402dd"
        );
    }

    #[test]
    fn zero_implementation_is_unresolved() {
        let resolution = ProxyResolution::from_metadata(&meta(
            true,
            Some("0x0000000000000000000000000000000000000000"),
        ));
        assert!(matches!(resolution, ProxyResolution::ProxyUnresolved { .. }));
        assert_eq!(resolution.target(PROXY), PROXY);
        assert!(resolution.is_proxy());
    }

    #[test]
    fn missing_implementation_is_unresolved() {
        assert!(matches!(
            ProxyResolution::from_metadata(&meta(true, None)),
            ProxyResolution::ProxyUnresolved { .. }
        ));
    }

    #[test]
    fn garbled_implementation_keeps_the_proxy() {
        let metadata = SourceMetadata {
            proxy: true,
            implementation_error: Some("bad implementation address \"garbage\"".into()),
            ..Default::default()
        };
        let resolution = ProxyResolution::from_metadata(&metadata);
        assert!(matches!(
            &resolution,
            ProxyResolution::ProxyUnresolved { reason } if reason.contains("garbage")
        ));
        assert_eq!(resolution.target(PROXY), PROXY);
    }
}
