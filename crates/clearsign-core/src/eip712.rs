//! EIP-712 `encodeType` builder.
//!
//! EIP-712 encodes a struct type as its own definition followed by the
//! definitions of every struct it references, sorted by name:
//!
//! ```text
//! Mail(Person from,Person to,string contents)Person(string name,address wallet)
//! ```
//!
//! Descriptors for typed messages key their formats by this string.
//!
//! # Reference
//! <https://eips.ethereum.org/EIPS/eip-712#definition-of-encodetype>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::selector::keccak256;

/// The domain type never participates in a message's type encoding.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// A single field within an EIP-712 type definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedField {
    /// Field name
    pub name: String,
    /// Solidity type string (e.g. "address", "uint256", "Person[]")
    #[serde(rename = "type")]
    pub ty: String,
}

/// Named struct definitions: type name → ordered fields.
pub type TypeGraph = IndexMap<String, Vec<TypedField>>;

/// One typed-message schema as declared in a descriptor's `eip712.schemas`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSchema {
    pub primary_type: String,
    pub types: TypeGraph,
}

impl MessageSchema {
    /// Parse a schema object. Returns `None` for URL references or malformed entries.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// `encodeType` of this schema's primary type.
    pub fn encode_primary(&self) -> String {
        encode_type(&self.types, &self.primary_type)
    }
}

/// Build the canonical `encodeType` string for `primary`.
///
/// If `primary` is not defined or has no fields, it is returned unchanged.
pub fn encode_type(types: &TypeGraph, primary: &str) -> String {
    match types.get(primary) {
        Some(fields) if !fields.is_empty() && primary != DOMAIN_TYPE => {}
        _ => return primary.to_string(),
    }

    let mut visited = HashSet::new();
    let mut encodings = BTreeMap::new();
    collect(types, primary, &mut visited, &mut encodings);

    let mut out = encodings.remove(primary).unwrap_or_default();
    for encoding in encodings.into_values() {
        out.push_str(&encoding);
    }
    out
}

/// `keccak256(encodeType(primary))` as `0x`-prefixed hex.
pub fn type_hash(types: &TypeGraph, primary: &str) -> String {
    format!("0x{}", hex::encode(keccak256(encode_type(types, primary).as_bytes())))
}

/// Strip every array suffix: `Person[][2]` → `Person`.
pub fn base_type(ty: &str) -> &str {
    match ty.find('[') {
        Some(i) => &ty[..i],
        None => ty,
    }
}

fn collect(
    types: &TypeGraph,
    name: &str,
    visited: &mut HashSet<String>,
    encodings: &mut BTreeMap<String, String>,
) {
    if name == DOMAIN_TYPE || !visited.insert(name.to_string()) {
        return;
    }
    let Some(fields) = types.get(name) else {
        return;
    };

    let params: Vec<String> = fields.iter().map(|f| format!("{} {}", f.ty, f.name)).collect();
    encodings.insert(name.to_string(), format!("{name}({})", params.join(",")));

    for field in fields {
        let dep = base_type(&field.ty);
        if types.contains_key(dep) {
            collect(types, dep, visited, encodings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ty: &str, name: &str) -> TypedField {
        TypedField { name: name.into(), ty: ty.into() }
    }

    fn mail_graph() -> TypeGraph {
        let mut types = TypeGraph::new();
        types.insert(
            DOMAIN_TYPE.into(),
            vec![field("string", "name"), field("uint256", "chainId")],
        );
        types.insert(
            "Mail".into(),
            vec![field("Person", "from"), field("Person", "to"), field("string", "contents")],
        );
        types.insert("Person".into(), vec![field("string", "name"), field("address", "wallet")]);
        types
    }

    #[test]
    fn single_type() {
        let mut types = TypeGraph::new();
        types.insert("Person".into(), vec![field("address", "wallet")]);
        assert_eq!(encode_type(&types, "Person"), "Person(address wallet)");
    }

    #[test]
    fn dependency_follows_primary_once() {
        let encoded = encode_type(&mail_graph(), "Mail");
        assert_eq!(
            encoded,
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
        assert_eq!(encoded.matches("Person(").count(), 1);
        assert!(!encoded.contains(DOMAIN_TYPE));
    }

    #[test]
    fn dependencies_sorted_alphabetically() {
        let mut types = TypeGraph::new();
        types.insert("Order".into(), vec![field("Zeta[]", "z"), field("Asset", "a")]);
        types.insert("Zeta".into(), vec![field("uint8", "v")]);
        types.insert("Asset".into(), vec![field("address", "token"), field("Zeta", "inner")]);
        assert_eq!(
            encode_type(&types, "Order"),
            "Order(Zeta[] z,Asset a)Asset(address token,Zeta inner)Zeta(uint8 v)"
        );
    }

    #[test]
    fn cycles_terminate() {
        let mut types = TypeGraph::new();
        types.insert("Node".into(), vec![field("Node[]", "children"), field("Leaf", "leaf")]);
        types.insert("Leaf".into(), vec![field("Node", "parent")]);
        assert_eq!(
            encode_type(&types, "Node"),
            "Node(Node[] children,Leaf leaf)Leaf(Node parent)"
        );
    }

    #[test]
    fn undefined_primary_is_unchanged() {
        assert_eq!(encode_type(&mail_graph(), "Unknown"), "Unknown");
        let mut types = TypeGraph::new();
        types.insert("Empty".into(), vec![]);
        assert_eq!(encode_type(&types, "Empty"), "Empty");
    }

    #[test]
    fn mail_type_hash_matches_eip712_example() {
        assert_eq!(
            type_hash(&mail_graph(), "Mail"),
            "0xa0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2"
        );
    }

    #[test]
    fn message_schema_from_descriptor_json() {
        let value = serde_json::json!({
            "primaryType": "Person",
            "types": { "Person": [{ "name": "wallet", "type": "address" }] }
        });
        let schema = MessageSchema::from_value(&value).unwrap();
        assert_eq!(schema.encode_primary(), "Person(address wallet)");
        assert!(MessageSchema::from_value(&serde_json::json!("https://example.org/schema.json")).is_none());
    }
}
