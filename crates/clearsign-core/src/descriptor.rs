//! Typed view of a clear-signing descriptor.
//!
//! Transformations work on raw `serde_json::Value` trees so unknown keys
//! survive untouched; this module gives typed access to the parts the checker
//! and the CLI read. Unknown keys are ignored here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::DescriptorError;

/// `$schema` marker of descriptors written against the first schema version.
pub const SCHEMA_V1_MARKER: &str = "erc7730-v1.schema.json";
/// `$schema` marker of descriptors written against the second schema version.
pub const SCHEMA_V2_MARKER: &str = "erc7730-v2.schema.json";

/// A deployed instance of the bound contract or verifying contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub chain_id: u64,
    pub address: String,
}

/// Binding to a smart contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractBinding {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    /// Inline ABI array or a URL (first schema version only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_matcher: Option<String>,
}

/// Binding to an EIP-712 typed message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedMessageBinding {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Value>,
    /// Type schemas (first schema version only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<Value>,
}

/// The `context` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<ContractBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip712: Option<TypedMessageBinding>,
}

/// What a descriptor binds to.
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    Contract(&'a ContractBinding),
    TypedMessage(&'a TypedMessageBinding),
}

impl Binding<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Contract(_) => "contract",
            Binding::TypedMessage(_) => "eip712",
        }
    }

    pub fn deployments(&self) -> &[Deployment] {
        match self {
            Binding::Contract(c) => &c.deployments,
            Binding::TypedMessage(m) => &m.deployments,
        }
    }
}

/// One display field. Nested `fields` describe struct members.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldEntry>,
}

/// One entry of `display.formats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Value>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded: Option<Vec<String>>,
}

/// The `display` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Display {
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
    #[serde(default)]
    pub formats: IndexMap<String, FormatEntry>,
}

/// A parsed descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<String>,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub display: Display,
}

impl Descriptor {
    pub fn from_value(value: &Value) -> Result<Self, DescriptorError> {
        Ok(Self::deserialize(value)?)
    }

    pub fn from_json(text: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The binding declared in `context`.
    pub fn binding(&self) -> Result<Binding<'_>, DescriptorError> {
        match (&self.context.contract, &self.context.eip712) {
            (Some(contract), _) => Ok(Binding::Contract(contract)),
            (None, Some(message)) => Ok(Binding::TypedMessage(message)),
            (None, None) => Err(DescriptorError::MissingContext),
        }
    }

    /// The contract binding, rejecting typed-message descriptors.
    pub fn contract(&self) -> Result<&ContractBinding, DescriptorError> {
        match self.binding()? {
            Binding::Contract(contract) => Ok(contract),
            other => Err(DescriptorError::NotContractBinding { found: other.kind() }),
        }
    }

    /// Format keys in document order.
    pub fn format_keys(&self) -> impl Iterator<Item = &str> {
        self.display.formats.keys().map(String::as_str)
    }

    pub fn is_v1(&self) -> bool {
        self.schema.as_deref().is_some_and(|s| s.contains(SCHEMA_V1_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contract_descriptor() {
        let d = Descriptor::from_value(&json!({
            "$schema": "../../specs/erc7730-v1.schema.json",
            "context": {
                "$id": "Tether USD",
                "contract": {
                    "deployments": [{ "chainId": 1, "address": "0xdAC17F958D2ee523a2206206994597C13D831ec7" }],
                    "abi": []
                }
            },
            "metadata": { "owner": "Tether" },
            "display": { "formats": {
                "transfer(address to,uint256 value)": { "intent": "Send", "fields": [{ "path": "to" }] },
                "approve": { "fields": [] }
            }}
        }))
        .unwrap();
        assert!(d.is_v1());
        let contract = d.contract().unwrap();
        assert_eq!(contract.deployments[0].chain_id, 1);
        let keys: Vec<&str> = d.format_keys().collect();
        assert_eq!(keys, vec!["transfer(address to,uint256 value)", "approve"]);
    }

    #[test]
    fn typed_message_is_rejected_by_contract() {
        let d = Descriptor::from_value(&json!({
            "context": { "eip712": { "deployments": [], "schemas": [] } }
        }))
        .unwrap();
        assert!(matches!(
            d.contract(),
            Err(DescriptorError::NotContractBinding { found: "eip712" })
        ));
    }

    #[test]
    fn missing_context() {
        let d = Descriptor::from_value(&json!({ "display": { "formats": {} } })).unwrap();
        assert!(matches!(d.binding(), Err(DescriptorError::MissingContext)));
    }
}
