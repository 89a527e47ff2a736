//! Small helpers for editing `serde_json::Value` trees in place.

use serde_json::{Map, Value};

/// Object at `path`, if every segment exists and is an object.
pub fn object_at<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    path.iter()
        .try_fold(tree, |node, key| node.get(*key))?
        .as_object()
}

/// Mutable object at `path`, if every segment exists and is an object.
pub fn object_at_mut<'a>(tree: &'a mut Value, path: &[&str]) -> Option<&'a mut Map<String, Value>> {
    path.iter()
        .try_fold(tree, |node, key| node.get_mut(*key))?
        .as_object_mut()
}

/// Remove `key` from the object at `path`. Returns whether anything was removed.
pub fn remove_at(tree: &mut Value, path: &[&str], key: &str) -> bool {
    object_at_mut(tree, path)
        .and_then(|obj| obj.shift_remove(key))
        .is_some()
}

/// Take a list of strings stored under `key`, removing the key.
/// Non-string items are dropped; a non-array value yields an empty list.
pub fn take_string_list(obj: &mut Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let value = obj.shift_remove(key)?;
    Some(
        value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
    )
}

/// Recursively delete object keys whose value is `null`. Returns the count removed.
pub fn strip_nulls(value: &mut Value) -> usize {
    match value {
        Value::Object(obj) => {
            let before = obj.len();
            obj.retain(|_, v| !v.is_null());
            let mut removed = before - obj.len();
            for v in obj.values_mut() {
                removed += strip_nulls(v);
            }
            removed
        }
        Value::Array(items) => items.iter_mut().map(strip_nulls).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_nulls_recurses_into_arrays() {
        let mut v = json!({ "a": null, "b": { "c": null, "d": 1 }, "e": [{ "f": null }, null] });
        assert_eq!(strip_nulls(&mut v), 3);
        assert_eq!(v, json!({ "b": { "d": 1 }, "e": [{}, null] }));
    }

    #[test]
    fn remove_at_nested() {
        let mut v = json!({ "context": { "contract": { "abi": [], "deployments": [] } } });
        assert!(remove_at(&mut v, &["context", "contract"], "abi"));
        assert!(!remove_at(&mut v, &["context", "contract"], "abi"));
        assert!(!remove_at(&mut v, &["context", "eip712"], "schemas"));
        assert_eq!(v, json!({ "context": { "contract": { "deployments": [] } } }));
    }

    #[test]
    fn take_string_list_filters_non_strings() {
        let mut obj = json!({ "required": ["a", 1, "b"] }).as_object().cloned().unwrap();
        assert_eq!(take_string_list(&mut obj, "required"), Some(vec!["a".into(), "b".into()]));
        assert!(obj.is_empty());
        assert_eq!(take_string_list(&mut obj, "required"), None);
    }
}
