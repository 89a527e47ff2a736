//! Ethereum JSON ABI functions, modelled with `alloy-json-abi`.
//!
//! Items are deserialized one by one as [`Function`] so a single malformed
//! entry never hides the rest of the ABI. Non-function items are dropped.

use alloy_json_abi::{Function, Param};
use serde_json::{Map, Value};

/// A function entry of a contract's JSON ABI.
pub type AbiFunction = Function;

/// Human-readable form of a parameter, keeping its name:
/// `(address token,uint256 amount)[] orders`.
pub fn human_readable_param(param: &Param) -> String {
    let ty = human_readable_type(param);
    if param.name.is_empty() {
        ty
    } else {
        format!("{ty} {}", param.name)
    }
}

/// Type with tuple components expanded, names kept inside the tuple.
pub fn human_readable_type(param: &Param) -> String {
    match param.ty.strip_prefix("tuple") {
        Some(suffix) => {
            let inner: Vec<String> = param.components.iter().map(human_readable_param).collect();
            format!("({}){suffix}", inner.join(","))
        }
        None => param.ty.clone(),
    }
}

/// `name(type1 name1,type2 name2)` with tuples expanded recursively.
pub fn human_readable_signature(function: &Function) -> String {
    let params: Vec<String> = function.inputs.iter().map(human_readable_param).collect();
    format!("{}({})", function.name, params.join(","))
}

/// Parse a JSON ABI array into its functions, skipping entries that do not
/// deserialize.
///
/// Accepts either a JSON array value or a JSON string containing one (as
/// block explorers return it). Anything else yields an empty list.
pub fn parse_abi(value: &Value) -> Vec<AbiFunction> {
    match value {
        Value::Array(items) => items.iter().filter_map(function_item).collect(),
        Value::String(text) => serde_json::from_str::<Value>(text)
            .map(|inner| match inner {
                Value::Array(_) => parse_abi(&inner),
                _ => Vec::new(),
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn function_item(item: &Value) -> Option<AbiFunction> {
    let object = item.as_object()?;
    // Omitted `type` defaults to function.
    match object.get("type") {
        None => {}
        Some(Value::String(kind)) if kind == "function" => {}
        Some(_) => return None,
    }

    // Older compilers omit fields that `Function` expects.
    let mut object: Map<String, Value> = object.clone();
    object.insert("type".into(), Value::String("function".into()));
    object.entry("outputs").or_insert_with(|| Value::Array(Vec::new()));
    if !["stateMutability", "constant", "payable"].iter().any(|k| object.contains_key(*k)) {
        object.insert("stateMutability".into(), Value::String("nonpayable".into()));
    }

    match serde_json::from_value::<Function>(Value::Object(object)) {
        Ok(function) if !function.name.is_empty() => Some(function),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "skipping malformed ABI entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn human_readable_expands_tuples() {
        let abi = parse_abi(&json!([{
            "type": "function",
            "name": "fill",
            "inputs": [
                { "name": "order", "type": "tuple[]", "components": [
                    { "name": "maker", "type": "address" },
                    { "name": "amounts", "type": "uint256[2]" }
                ]},
                { "name": "", "type": "bytes" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        }]));
        assert_eq!(abi.len(), 1);
        assert_eq!(
            human_readable_signature(&abi[0]),
            "fill((address maker,uint256[2] amounts)[] order,bytes)"
        );
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let abi = parse_abi(&json!([
            { "type": "function", "name": "ok", "inputs": [] },
            { "type": "function", "name": "bad", "inputs": [{ "name": "x" }] },
            { "type": "event", "name": "Transfer", "inputs": [] },
            { "type": "function", "name": "second", "inputs": [{ "name": "to", "type": "address" }] },
            42
        ]));
        let names: Vec<&str> = abi.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ok", "second"]);
    }

    #[test]
    fn abi_as_embedded_string() {
        let abi = parse_abi(&json!("[{\"name\":\"pause\",\"inputs\":[]}]"));
        assert_eq!(abi.len(), 1);
        assert_eq!(human_readable_signature(&abi[0]), "pause()");
    }

    #[test]
    fn selector_agrees_with_alloy() {
        let abi = parse_abi(&json!([{
            "type": "function",
            "name": "transfer",
            "inputs": [{ "name": "to", "type": "address" }, { "name": "value", "type": "uint256" }],
            "outputs": [{ "name": "", "type": "bool" }],
            "stateMutability": "nonpayable"
        }]));
        let normalized = crate::normalize(&human_readable_signature(&abi[0])).unwrap();
        assert_eq!(crate::selector_of(&normalized), abi[0].selector().to_string());
    }
}
