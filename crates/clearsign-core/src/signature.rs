//! Human-readable function signature parser and normalizer.
//!
//! Accepts Solidity-style signatures as they appear in descriptor format keys:
//!
//! ```text
//! swap(address executor,(address srcToken,uint256 amount)[] orders,bytes data)
//! ```
//!
//! and reduces them to the canonical form used for selector hashing:
//!
//! ```text
//! swap(address,(address,uint256)[],bytes)
//! ```
//!
//! The scanner counts parenthesis depth instead of relying on any escaping, so
//! tuples may nest to arbitrary depth. Normalizing an already-normalized
//! signature returns it unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SignatureError;

/// A parsed and canonicalized function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSignature {
    /// Function name, e.g. `transfer`
    pub name: String,
    /// Canonical top-level parameter types, in order
    pub types: Vec<String>,
    /// `(type1,type2,...)`
    pub types_key: String,
    /// `name + types_key`
    pub normalized: String,
}

impl NormalizedSignature {
    /// Number of top-level parameters.
    pub fn arity(&self) -> usize {
        self.types.len()
    }
}

impl fmt::Display for NormalizedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Normalize a signature, returning `None` when it cannot be parsed.
///
/// Callers treat `None` as "unparseable signature", never as a fatal error.
pub fn normalize(signature: &str) -> Option<NormalizedSignature> {
    parse(signature).ok()
}

/// Parse a signature, reporting why it could not be normalized.
pub fn parse(signature: &str) -> Result<NormalizedSignature, SignatureError> {
    let input = signature.trim();
    let body = input
        .strip_prefix("function ")
        .map(str::trim_start)
        .unwrap_or(input);

    let name_len = identifier_len(body);
    if name_len == 0 {
        return Err(SignatureError::NoMatch { input: input.to_string() });
    }
    let name = &body[..name_len];
    let rest = body[name_len..].trim_start();
    if !rest.starts_with('(') {
        return Err(SignatureError::NoMatch { input: input.to_string() });
    }

    // Anything after the closing parenthesis (`returns (...)`, modifiers) is ignored.
    let close = matching_paren(rest).ok_or_else(|| SignatureError::Unbalanced {
        input: input.to_string(),
    })?;
    let types = normalize_list(&rest[1..close], input)?;
    let types_key = format!("({})", types.join(","));

    Ok(NormalizedSignature {
        name: name.to_string(),
        normalized: format!("{name}{types_key}"),
        types,
        types_key,
    })
}

/// Split a parameter list on top-level commas only.
///
/// Commas nested inside parentheses belong to tuple types and never split.
pub fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, b) in list.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

/// Length in bytes of the identifier at the head of `s` (0 if none).
fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' || *b == b'$' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'$')
        .count()
}

/// Index of the parenthesis closing the one at index 0 of `s`.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn normalize_list(inner: &str, input: &str) -> Result<Vec<String>, SignatureError> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(inner)
        .into_iter()
        .enumerate()
        .map(|(position, param)| normalize_param(param.trim(), input, position))
        .collect()
}

/// Reduce one parameter (`type [name]`) to its canonical type.
fn normalize_param(param: &str, input: &str, position: usize) -> Result<String, SignatureError> {
    if param.is_empty() {
        return Err(SignatureError::EmptyParameter {
            input: input.to_string(),
            position,
        });
    }

    let param = match param.strip_prefix("tuple") {
        Some(rest) if rest.trim_start().starts_with('(') => rest.trim_start(),
        _ => param,
    };

    if param.starts_with('(') {
        let close = matching_paren(param).ok_or_else(|| SignatureError::Unbalanced {
            input: input.to_string(),
        })?;
        let components = normalize_list(&param[1..close], input)?;
        let suffix = array_suffix(&param[close + 1..]);
        return Ok(format!("({}){suffix}", components.join(",")));
    }

    // The base type ends at the first whitespace or bracket. Array suffixes
    // may be spaced apart from it; whatever follows them is the parameter
    // name or a data-location keyword.
    let base_end = param
        .find(|c: char| c.is_whitespace() || c == '[')
        .unwrap_or(param.len());
    let suffix = array_suffix(&param[base_end..]);
    Ok(format!("{}{suffix}", canonical_elementary(&param[..base_end])))
}

/// Collect a chain of `[]` / `[N]` suffixes at the head of `rest`.
fn array_suffix(rest: &str) -> String {
    let mut out = String::new();
    let mut s = rest;
    loop {
        let t = s.trim_start();
        let Some(after_open) = t.strip_prefix('[') else {
            break;
        };
        let Some(end) = after_open.find(']') else {
            break;
        };
        let size = after_open[..end].trim();
        if !size.chars().all(|c| c.is_ascii_digit()) {
            break;
        }
        out.push('[');
        out.push_str(size);
        out.push(']');
        s = &after_open[end + 1..];
    }
    out
}

/// Expand Solidity type aliases so the selector hash matches the compiler's.
fn canonical_elementary(token: &str) -> String {
    let (base, suffix) = match token.find('[') {
        Some(i) => (&token[..i], &token[i..]),
        None => (token, ""),
    };
    let base = match base {
        "uint" => "uint256",
        "int" => "int256",
        "byte" => "bytes1",
        "fixed" => "fixed128x18",
        "ufixed" => "ufixed128x18",
        other => other,
    };
    format!("{base}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_parameter_names() {
        let sig = normalize("transfer(address to, uint256 amount)").unwrap();
        assert_eq!(sig.name, "transfer");
        assert_eq!(sig.types, vec!["address", "uint256"]);
        assert_eq!(sig.types_key, "(address,uint256)");
        assert_eq!(sig.normalized, "transfer(address,uint256)");
    }

    #[test]
    fn nested_tuples_and_arrays() {
        let sig = normalize(
            "swap(address executor, (address srcToken, (uint8 v, bytes32 r)[2] sigs)[] desc, bytes data)",
        )
        .unwrap();
        assert_eq!(sig.normalized, "swap(address,(address,(uint8,bytes32)[2])[],bytes)");
        assert_eq!(sig.arity(), 3);
    }

    #[test]
    fn spaced_array_suffixes() {
        let sig = normalize("f(uint256 [] xs, (uint a) [2] t)").unwrap();
        assert_eq!(sig.normalized, "f(uint256[],(uint256)[2])");
        let sig = normalize("g(uint [ 3 ] [] memory grid, bytes32[] calldata ids)").unwrap();
        assert_eq!(sig.normalized, "g(uint256[3][],bytes32[])");
    }

    #[test]
    fn tuple_keyword_and_aliases() {
        let sig = normalize("function fill(tuple(uint a, int b) order, uint[] ids) returns (bool)").unwrap();
        assert_eq!(sig.normalized, "fill((uint256,int256),uint256[])");
    }

    #[test]
    fn empty_parameter_list() {
        let sig = normalize("pause()").unwrap();
        assert_eq!(sig.types_key, "()");
        assert_eq!(sig.arity(), 0);
    }

    #[test]
    fn no_match_is_none() {
        assert!(normalize("transfer").is_none());
        assert!(normalize("").is_none());
        assert!(normalize("0xa9059cbb").is_none());
        assert!(normalize("(address)").is_none());
    }

    #[test]
    fn unbalanced_is_reported() {
        assert!(matches!(
            parse("transfer(address,uint256"),
            Err(SignatureError::Unbalanced { .. })
        ));
        assert!(matches!(
            parse("f(uint256,,address)"),
            Err(SignatureError::EmptyParameter { position: 1, .. })
        ));
    }

    #[test]
    fn top_level_split_ignores_nested_commas() {
        let parts = split_top_level("address a,(uint256,bytes) t,bool");
        assert_eq!(parts, vec!["address a", "(uint256,bytes) t", "bool"]);
    }

    fn arb_type() -> impl Strategy<Value = String> {
        let leaf = prop::sample::select(vec![
            "address", "uint256", "uint", "bytes32", "bool", "string", "bytes", "int8",
        ])
        .prop_map(str::to_string);
        let leaf = (leaf, prop::sample::select(vec!["", "[]", "[3]", "[][2]"]))
            .prop_map(|(t, s)| format!("{t}{s}"));
        leaf.prop_recursive(3, 16, 4, |inner| {
            (
                prop::collection::vec((inner, prop::bool::ANY), 0..4),
                prop::sample::select(vec!["", "[]", "[4]"]),
            )
                .prop_map(|(items, suffix)| {
                    let body: Vec<String> = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, (t, named))| if named { format!("{t} p{i}") } else { t })
                        .collect();
                    format!("({}){suffix}", body.join(", "))
                })
        })
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            name in "[a-zA-Z_][a-zA-Z0-9_]{0,12}",
            params in prop::collection::vec((arb_type(), prop::bool::ANY), 0..5),
        ) {
            let list: Vec<String> = params
                .into_iter()
                .enumerate()
                .map(|(i, (t, named))| if named { format!("{t} arg{i}") } else { t })
                .collect();
            let raw = format!("{name}({})", list.join(", "));
            let once = normalize(&raw).expect("generated signature parses");
            let twice = normalize(&once.normalized).expect("normalized signature parses");
            prop_assert_eq!(once, twice);
        }
    }
}
