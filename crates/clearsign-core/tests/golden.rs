//! Golden selector tests over well-known mainnet functions.
//!
//! Each signature is written the way a descriptor format key would spell it
//! (parameter names, spacing, tuple expansion) and must hash to the selector
//! deployed contracts dispatch on.

use clearsign_core::{normalize, selector, AbiIndex, FuzzyMatcher};
use serde_json::json;

const GOLDEN: &[(&str, &str)] = &[
    ("transfer(address to,uint256 amount)", "0xa9059cbb"),
    ("transferFrom(address from, address to, uint256 value)", "0x23b872dd"),
    ("balanceOf(address owner)", "0x70a08231"),
    ("multicall(bytes[] data)", "0xac9650d8"),
    (
        "permit(address owner,address spender,uint256 value,uint256 deadline,uint8 v,bytes32 r,bytes32 s)",
        "0xd505accf",
    ),
    (
        "safeTransferFrom(address from,address to,uint256 id,uint256 amount,bytes data)",
        "0xf242432a",
    ),
    (
        "exactInputSingle((address tokenIn,address tokenOut,uint24 fee,address recipient,uint256 deadline,uint256 amountIn,uint256 amountOutMinimum,uint160 sqrtPriceLimitX96) params)",
        "0x414bf389",
    ),
];

#[test]
fn golden_selectors() {
    for (signature, expected) in GOLDEN {
        assert_eq!(
            selector(signature).as_deref(),
            Some(*expected),
            "selector mismatch for {signature}"
        );
    }
}

#[test]
fn golden_selectors_survive_renormalization() {
    for (signature, expected) in GOLDEN {
        let once = normalize(signature).unwrap();
        assert_eq!(selector(&once.normalized).as_deref(), Some(*expected));
    }
}

#[test]
fn index_and_matcher_agree_on_uniswap_router() {
    let abi = json!([
        { "type": "function", "name": "exactInputSingle", "stateMutability": "payable",
          "inputs": [{ "name": "params", "type": "tuple", "internalType": "struct ISwapRouter.ExactInputSingleParams",
            "components": [
              { "name": "tokenIn", "type": "address" },
              { "name": "tokenOut", "type": "address" },
              { "name": "fee", "type": "uint24" },
              { "name": "recipient", "type": "address" },
              { "name": "deadline", "type": "uint256" },
              { "name": "amountIn", "type": "uint256" },
              { "name": "amountOutMinimum", "type": "uint256" },
              { "name": "sqrtPriceLimitX96", "type": "uint160" }
            ]}],
          "outputs": [{ "name": "amountOut", "type": "uint256" }] },
        { "type": "function", "name": "multicall", "stateMutability": "payable",
          "inputs": [{ "name": "data", "type": "bytes[]" }],
          "outputs": [{ "name": "results", "type": "bytes[]" }] }
    ]);
    let index = AbiIndex::from_json(&abi);
    assert_eq!(index.by_selector("0x414bf389").len(), 1);

    // A descriptor that forgot the deadline member still resolves to the router call.
    let best = FuzzyMatcher::new(&index)
        .best("exactInputSingle((address,address,uint24,address,uint256,uint256,uint160))")
        .unwrap();
    assert_eq!(best.function.entry.name, "exactInputSingle");
}
