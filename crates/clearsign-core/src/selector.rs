//! Function selector computation.
//!
//! The selector of a function is the first 4 bytes of the keccak256 hash of its
//! canonical signature, e.g.:
//!   keccak256("transfer(address,uint256)")[..4] → 0xa9059cbb
//!
//! Descriptor keys are normalized first, so `transfer(address to,uint256 amount)`
//! and `transfer(address,uint256)` share a selector.

use tiny_keccak::{Hasher, Keccak};

use crate::signature::{normalize, NormalizedSignature};

/// Full keccak256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Selector of an already-normalized signature, as `0x`-prefixed lowercase hex.
pub fn selector_of(signature: &NormalizedSignature) -> String {
    let digest = keccak256(signature.normalized.as_bytes());
    format!("0x{}", hex::encode(&digest[..4]))
}

/// Normalize `signature` and compute its selector.
/// Returns `None` if the signature cannot be parsed.
pub fn selector(signature: &str) -> Option<String> {
    normalize(signature).map(|sig| selector_of(&sig))
}

/// Returns the lowercase form of `key` if it is a raw 4-byte selector (`0x` + 8 hex digits).
pub fn as_raw_selector(key: &str) -> Option<String> {
    let hex = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X"))?;
    if hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("0x{}", hex.to_ascii_lowercase()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_selector() {
        assert_eq!(selector("transfer(address,uint256)").unwrap(), "0xa9059cbb");
    }

    #[test]
    fn named_parameters_do_not_change_selector() {
        assert_eq!(
            selector("transfer(address to, uint256 amount)"),
            selector("transfer(address,uint256)")
        );
    }

    #[test]
    fn erc20_approve_selector() {
        assert_eq!(selector("approve(address spender,uint256 value)").unwrap(), "0x095ea7b3");
    }

    #[test]
    fn unparseable_signature_has_no_selector() {
        assert!(selector("transfer").is_none());
    }

    #[test]
    fn raw_selector_detection() {
        assert_eq!(as_raw_selector("0xA9059CBB").as_deref(), Some("0xa9059cbb"));
        assert!(as_raw_selector("0xa9059cb").is_none());
        assert!(as_raw_selector("transfer(address,uint256)").is_none());
    }
}
