//! EVM chain identifiers used in descriptor deployments.

/// Human-readable name for a chain id, for reports and logs.
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "ethereum",
        10 => "optimism",
        56 => "bsc",
        100 => "gnosis",
        137 => "polygon",
        250 => "fantom",
        324 => "zksync",
        1101 => "polygon-zkevm",
        5000 => "mantle",
        8453 => "base",
        42161 => "arbitrum",
        42220 => "celo",
        43114 => "avalanche",
        59144 => "linea",
        81457 => "blast",
        534352 => "scroll",
        11155111 => "sepolia",
        84532 => "base-sepolia",
        421614 => "arbitrum-sepolia",
        _ => "unknown",
    }
}

/// Chains served by the Etherscan v2 multichain API under a single key.
pub const ETHERSCAN_V2_CHAINS: &[u64] = &[
    1, 10, 56, 100, 137, 250, 324, 1101, 5000, 8453, 42161, 42220, 43114, 59144, 81457, 534352,
    11155111, 84532, 421614,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_names() {
        assert_eq!(chain_name(1), "ethereum");
        assert_eq!(chain_name(42161), "arbitrum");
        assert_eq!(chain_name(999_999), "unknown");
    }

    #[test]
    fn every_etherscan_chain_is_named() {
        assert!(ETHERSCAN_V2_CHAINS.iter().all(|&id| chain_name(id) != "unknown"));
    }
}
