//! Table-driven deep merge of descriptor trees.
//!
//! How two values meet is decided by the key they sit under:
//!
//! | Policy        | Both sides                 | Result                                   |
//! |---------------|----------------------------|------------------------------------------|
//! | `Replace`     | anything                   | overlay wins                             |
//! | `MergeByKey`  | arrays of objects          | entries paired by an id field and merged |
//! | `MergeObject` | objects                    | per-key union, shared keys merged        |
//!
//! Keys without an entry in the table merge objects recursively and let the
//! overlay win for everything else (arrays, scalars, type mismatches).

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// How the values under one key are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergePolicy {
    /// The overlay value replaces the base value outright.
    Replace,
    /// Arrays of objects merged entry-by-entry on the string field `key`.
    MergeByKey { key: String },
    /// Objects merged key-by-key, recursively.
    MergeObject,
}

/// Key name → merge policy.
#[derive(Debug, Clone)]
pub struct MergeRules {
    policies: HashMap<String, MergePolicy>,
}

impl Default for MergeRules {
    /// Descriptor rules: `fields` merge by `path`, `formats` merge per key.
    fn default() -> Self {
        Self::empty()
            .with(
                "fields",
                MergePolicy::MergeByKey {
                    key: "path".into(),
                },
            )
            .with("formats", MergePolicy::MergeObject)
    }
}

impl MergeRules {
    /// A table with no per-key policies.
    pub fn empty() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// Set the policy for `key`.
    pub fn with(mut self, key: impl Into<String>, policy: MergePolicy) -> Self {
        self.policies.insert(key.into(), policy);
        self
    }

    pub fn policy(&self, key: &str) -> Option<&MergePolicy> {
        self.policies.get(key)
    }

    /// Merge `overlay` on top of `base`, returning a new tree.
    pub fn merge(&self, base: &Value, overlay: &Value) -> Value {
        match (base, overlay) {
            (Value::Object(b), Value::Object(o)) => Value::Object(self.merge_objects(b, o)),
            _ => overlay.clone(),
        }
    }

    fn merge_objects(&self, base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
        let mut out = base.clone();
        for (key, value) in overlay {
            let merged = match out.get(key) {
                Some(existing) => self.merge_under(key, existing, value),
                None => value.clone(),
            };
            out.insert(key.clone(), merged);
        }
        out
    }

    fn merge_under(&self, key: &str, base: &Value, overlay: &Value) -> Value {
        match (self.policy(key), base, overlay) {
            (Some(MergePolicy::Replace), _, _) => overlay.clone(),
            (Some(MergePolicy::MergeByKey { key: id }), Value::Array(b), Value::Array(o)) => {
                Value::Array(self.merge_by_key(id, b, o))
            }
            (_, Value::Object(b), Value::Object(o)) => Value::Object(self.merge_objects(b, o)),
            _ => overlay.clone(),
        }
    }

    /// Base order is preserved; overlay-only entries are appended in order.
    fn merge_by_key(&self, id: &str, base: &[Value], overlay: &[Value]) -> Vec<Value> {
        let id_of = |v: &Value| v.get(id).and_then(Value::as_str).map(str::to_string);

        let mut overlay_by_id: HashMap<String, &Value> = HashMap::new();
        for entry in overlay {
            if let Some(k) = id_of(entry) {
                overlay_by_id.entry(k).or_insert(entry);
            }
        }

        let mut base_ids = HashSet::new();
        let mut out = Vec::with_capacity(base.len() + overlay.len());
        for entry in base {
            match id_of(entry) {
                Some(k) => {
                    let merged = match overlay_by_id.get(&k) {
                        Some(o) => self.merge(entry, o),
                        None => entry.clone(),
                    };
                    base_ids.insert(k);
                    out.push(merged);
                }
                None => out.push(entry.clone()),
            }
        }
        for entry in overlay {
            match id_of(entry) {
                Some(k) if base_ids.contains(&k) => {}
                _ => out.push(entry.clone()),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_merge_by_path() {
        let rules = MergeRules::default();
        let base = json!({ "fields": [{ "path": "a", "label": "A" }, { "path": "b", "label": "B" }] });
        let overlay = json!({ "fields": [{ "path": "b", "label": "B2" }, { "path": "c", "label": "C" }] });
        assert_eq!(
            rules.merge(&base, &overlay),
            json!({ "fields": [
                { "path": "a", "label": "A" },
                { "path": "b", "label": "B2" },
                { "path": "c", "label": "C" }
            ]})
        );
    }

    #[test]
    fn shared_field_keeps_base_attributes() {
        let rules = MergeRules::default();
        let base = json!({ "fields": [{ "path": "amount", "label": "Amount", "format": "amount" }] });
        let overlay = json!({ "fields": [{ "path": "amount", "label": "Sent" }] });
        assert_eq!(
            rules.merge(&base, &overlay)["fields"][0],
            json!({ "path": "amount", "label": "Sent", "format": "amount" })
        );
    }

    #[test]
    fn formats_union_with_recursive_merge() {
        let rules = MergeRules::default();
        let base = json!({ "formats": {
            "f()": { "intent": "F", "fields": [{ "path": "x" }] },
            "g()": { "intent": "G" }
        }});
        let overlay = json!({ "formats": {
            "f()": { "fields": [{ "path": "y" }] },
            "h()": { "intent": "H" }
        }});
        let merged = rules.merge(&base, &overlay);
        assert_eq!(merged["formats"]["f()"]["intent"], "F");
        assert_eq!(merged["formats"]["f()"]["fields"], json!([{ "path": "x" }, { "path": "y" }]));
        assert_eq!(merged["formats"]["g()"]["intent"], "G");
        assert_eq!(merged["formats"]["h()"]["intent"], "H");
    }

    #[test]
    fn arrays_scalars_and_mismatches_take_overlay() {
        let rules = MergeRules::default();
        let base = json!({ "a": [1, 2], "b": "x", "c": { "d": 1 }, "e": 1 });
        let overlay = json!({ "a": [3], "b": "y", "c": "flat", "e": { "f": 2 } });
        assert_eq!(rules.merge(&base, &overlay), json!({ "a": [3], "b": "y", "c": "flat", "e": { "f": 2 } }));
    }

    #[test]
    fn replace_policy_skips_recursion() {
        let rules = MergeRules::default().with("metadata", MergePolicy::Replace);
        let base = json!({ "metadata": { "owner": "A", "info": {} } });
        let overlay = json!({ "metadata": { "owner": "B" } });
        assert_eq!(rules.merge(&base, &overlay), json!({ "metadata": { "owner": "B" } }));
    }

    #[test]
    fn entries_without_path_are_kept() {
        let rules = MergeRules::default();
        let base = json!({ "fields": [{ "$ref": "$.display.definitions.to" }, { "path": "a" }] });
        let overlay = json!({ "fields": [{ "label": "loose" }] });
        assert_eq!(
            rules.merge(&base, &overlay)["fields"],
            json!([{ "$ref": "$.display.definitions.to" }, { "path": "a" }, { "label": "loose" }])
        );
    }
}
