//! First-version → second-version descriptor migration.
//!
//! Migration is an ordered list of [`Rule`]s applied to a copy of the input
//! tree. Every rule checks its own precondition and does nothing when it is
//! absent, so migrating an already-migrated tree is a no-op.
//!
//! ```text
//! BumpSchema → CopyBindingId → DropLegacyMetadata → DropAddressMatcher
//!   → RewriteFormatKeys → DropRawSchemas → ExplicitVisibility → StripNulls
//! ```

use clearsign_core::descriptor::{SCHEMA_V1_MARKER, SCHEMA_V2_MARKER};
use clearsign_core::{as_raw_selector, AbiIndex, FuzzyMatcher, MatchTarget, MessageSchema};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::error::MigrateError;
use crate::tree::{object_at, object_at_mut, remove_at, strip_nulls, take_string_list};

pub const VISIBLE_ALWAYS: &str = "always";
pub const VISIBLE_NEVER: &str = "never";

/// One structural rewrite step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// `$schema` v1 marker → v2 marker
    BumpSchema,
    /// `context.$id` → `metadata.contractName` (contract bindings)
    CopyBindingId,
    /// delete `metadata.info.lastUpdate`
    DropLegacyMetadata,
    /// delete `context.contract.addressMatcher`
    DropAddressMatcher,
    /// format keys → canonical signatures / encodeType strings
    RewriteFormatKeys,
    /// delete `context.contract.abi` and `context.eip712.schemas`
    DropRawSchemas,
    /// `required` / `excluded` → per-field `visible`
    ExplicitVisibility,
    /// delete null-valued keys everywhere
    StripNulls,
}

/// Rules in application order.
pub const RULES: [Rule; 8] = [
    Rule::BumpSchema,
    Rule::CopyBindingId,
    Rule::DropLegacyMetadata,
    Rule::DropAddressMatcher,
    Rule::RewriteFormatKeys,
    Rule::DropRawSchemas,
    Rule::ExplicitVisibility,
    Rule::StripNulls,
];

/// Counters for one migration. Fold several with [`MigrationStats::absorb`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStats {
    pub rules_applied: Vec<Rule>,
    pub keys_rewritten: usize,
    /// Format keys left as-is because no ABI entry or type schema matched
    pub keys_unresolved: Vec<String>,
    pub fields_marked_always: usize,
    pub fields_marked_never: usize,
    pub nulls_stripped: usize,
}

impl MigrationStats {
    pub fn absorb(&mut self, other: &MigrationStats) {
        for rule in &other.rules_applied {
            if !self.rules_applied.contains(rule) {
                self.rules_applied.push(*rule);
            }
        }
        self.keys_rewritten += other.keys_rewritten;
        self.keys_unresolved.extend(other.keys_unresolved.iter().cloned());
        self.fields_marked_always += other.fields_marked_always;
        self.fields_marked_never += other.fields_marked_never;
        self.nulls_stripped += other.nulls_stripped;
    }
}

/// A migrated tree and what changed.
#[derive(Debug, Clone)]
pub struct Migration {
    pub descriptor: Value,
    pub stats: MigrationStats,
}

impl Migration {
    pub fn changed(&self) -> bool {
        !self.stats.rules_applied.is_empty()
    }
}

/// Apply every rule to a copy of `descriptor`. The input is never modified.
pub fn migrate(descriptor: &Value) -> Migration {
    let mut tree = descriptor.clone();
    let mut stats = MigrationStats::default();
    for rule in RULES {
        if rule.apply(&mut tree, &mut stats) {
            stats.rules_applied.push(rule);
        }
    }
    Migration { descriptor: tree, stats }
}

/// Parse `text`, check it is a first-version descriptor and migrate it.
pub fn migrate_document(text: &str) -> Result<Migration, MigrateError> {
    let tree: Value = serde_json::from_str(text)?;
    if !tree.is_object() {
        return Err(MigrateError::Malformed {
            reason: "top-level value is not an object".into(),
        });
    }
    let schema = tree.get("$schema").and_then(Value::as_str);
    if !schema.is_some_and(|s| s.contains(SCHEMA_V1_MARKER)) {
        return Err(MigrateError::UnexpectedSchema {
            found: schema.map(str::to_string),
        });
    }
    Ok(migrate(&tree))
}

impl Rule {
    /// Apply this rule in place. Returns whether the tree changed.
    pub fn apply(self, tree: &mut Value, stats: &mut MigrationStats) -> bool {
        match self {
            Rule::BumpSchema => bump_schema(tree),
            Rule::CopyBindingId => copy_binding_id(tree),
            Rule::DropLegacyMetadata => remove_at(tree, &["metadata", "info"], "lastUpdate"),
            Rule::DropAddressMatcher => remove_at(tree, &["context", "contract"], "addressMatcher"),
            Rule::RewriteFormatKeys => rewrite_format_keys(tree, stats),
            Rule::DropRawSchemas => {
                let abi = remove_at(tree, &["context", "contract"], "abi");
                let schemas = remove_at(tree, &["context", "eip712"], "schemas");
                abi || schemas
            }
            Rule::ExplicitVisibility => explicit_visibility(tree, stats),
            Rule::StripNulls => {
                let removed = strip_nulls(tree);
                stats.nulls_stripped += removed;
                removed > 0
            }
        }
    }
}

fn bump_schema(tree: &mut Value) -> bool {
    let Some(slot) = tree.get_mut("$schema") else {
        return false;
    };
    match slot.as_str() {
        Some(s) if s.contains(SCHEMA_V1_MARKER) => {
            *slot = Value::String(s.replace(SCHEMA_V1_MARKER, SCHEMA_V2_MARKER));
            true
        }
        _ => false,
    }
}

fn copy_binding_id(tree: &mut Value) -> bool {
    let Some(context) = object_at(tree, &["context"]) else {
        return false;
    };
    if !context.contains_key("contract") {
        return false;
    }
    let Some(id) = context.get("$id").and_then(Value::as_str).map(str::to_string) else {
        return false;
    };

    let Some(root) = tree.as_object_mut() else {
        return false;
    };
    let metadata = root
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    // `null` is stripped later, so it must count as absent here.
    if metadata.is_null() {
        *metadata = Value::Object(Map::new());
    }
    match metadata.as_object_mut() {
        Some(meta) if !meta.contains_key("contractName") => {
            meta.insert("contractName".into(), Value::String(id));
            true
        }
        _ => false,
    }
}

/// How format keys are resolved for the descriptor's binding.
enum KeyResolver {
    Contract(AbiIndex),
    TypedMessage(Vec<MessageSchema>),
}

impl KeyResolver {
    fn for_tree(tree: &Value) -> Option<Self> {
        if let Some(abi) = object_at(tree, &["context", "contract"]).and_then(|c| c.get("abi")) {
            if abi.is_array() {
                return Some(KeyResolver::Contract(AbiIndex::from_json(abi)));
            }
            tracing::warn!("contract ABI is not inline; format keys cannot be resolved offline");
            return None;
        }
        let schemas = object_at(tree, &["context", "eip712"])?
            .get("schemas")?
            .as_array()?;
        Some(KeyResolver::TypedMessage(
            schemas.iter().filter_map(MessageSchema::from_value).collect(),
        ))
    }

    fn resolve(&self, key: &str) -> Option<String> {
        match self {
            KeyResolver::Contract(index) => resolve_contract_key(index, key),
            KeyResolver::TypedMessage(schemas) => resolve_message_key(schemas, key),
        }
    }
}

/// Canonical human-readable signature for a contract format key.
///
/// Keys may be a raw selector, a bare function name, or a signature. Only an
/// ABI function with the same name (or selector) is accepted; among
/// overloads the fuzzy matcher picks the closest.
fn resolve_contract_key(index: &AbiIndex, key: &str) -> Option<String> {
    if let Some(selector) = as_raw_selector(key) {
        return index.by_selector(&selector).first().map(|f| f.signature.clone());
    }

    let mut target = MatchTarget::from_key(key);
    if target.name.is_empty() {
        target.name = key.trim().to_string();
    }
    let overloads = index.by_name(&target.name);
    FuzzyMatcher::new(index)
        .best_among(overloads, &target)
        .map(|c| c.function.signature.clone())
}

fn resolve_message_key(schemas: &[MessageSchema], key: &str) -> Option<String> {
    // Already an encodeType string of some schema.
    if schemas.iter().any(|s| s.encode_primary() == key) {
        return Some(key.to_string());
    }
    schemas
        .iter()
        .find(|s| s.primary_type == key)
        .or_else(|| schemas.iter().find(|s| s.types.contains_key(key)))
        .map(|s| clearsign_core::encode_type(&s.types, key))
}

fn rewrite_format_keys(tree: &mut Value, stats: &mut MigrationStats) -> bool {
    let Some(resolver) = KeyResolver::for_tree(tree) else {
        return false;
    };
    let Some(formats) = object_at_mut(tree, &["display", "formats"]) else {
        return false;
    };

    let mut rewritten = Map::with_capacity(formats.len());
    let mut changed = false;
    for (key, entry) in std::mem::take(formats) {
        match resolver.resolve(&key) {
            Some(new_key) if new_key == key => {
                rewritten.insert(key, entry);
            }
            Some(new_key) if !rewritten.contains_key(&new_key) => {
                tracing::debug!(from = %key, to = %new_key, "rewriting format key");
                stats.keys_rewritten += 1;
                changed = true;
                rewritten.insert(new_key, entry);
            }
            _ => {
                stats.keys_unresolved.push(key.clone());
                rewritten.insert(key, entry);
            }
        }
    }
    *formats = rewritten;
    changed
}

fn explicit_visibility(tree: &mut Value, stats: &mut MigrationStats) -> bool {
    let Some(formats) = object_at_mut(tree, &["display", "formats"]) else {
        return false;
    };

    let mut changed = false;
    for entry in formats.values_mut() {
        let Some(format) = entry.as_object_mut() else {
            continue;
        };
        let required = take_string_list(format, "required");
        let excluded = take_string_list(format, "excluded");
        let screens = format.shift_remove("screens").is_some();
        if required.is_none() && excluded.is_none() && !screens {
            continue;
        }
        changed = true;

        let required: HashSet<String> = required.unwrap_or_default().into_iter().collect();
        let excluded = excluded.unwrap_or_default();
        let excluded_set: HashSet<&str> = excluded.iter().map(String::as_str).collect();

        let fields = format
            .entry("fields")
            .or_insert_with(|| Value::Array(Vec::new()));
        let Some(fields) = fields.as_array_mut() else {
            continue;
        };

        let mut seen = HashSet::new();
        mark_fields(fields, "", &required, &excluded_set, &mut seen, stats);

        for path in excluded.iter().filter(|p| !seen.contains(p.as_str())) {
            fields.push(json!({ "path": path, "visible": VISIBLE_NEVER }));
            stats.fields_marked_never += 1;
        }
    }
    changed
}

fn mark_fields(
    fields: &mut [Value],
    prefix: &str,
    required: &HashSet<String>,
    excluded: &HashSet<&str>,
    seen: &mut HashSet<String>,
    stats: &mut MigrationStats,
) {
    for field in fields.iter_mut() {
        let Some(obj) = field.as_object_mut() else {
            continue;
        };
        let full_path = obj.get("path").and_then(Value::as_str).map(|path| {
            if prefix.is_empty() {
                path.to_string()
            } else {
                format!("{prefix}.{path}")
            }
        });

        if let Some(path) = &full_path {
            seen.insert(path.clone());
            if !obj.contains_key("visible") {
                if required.contains(path) {
                    obj.insert("visible".into(), Value::String(VISIBLE_ALWAYS.into()));
                    stats.fields_marked_always += 1;
                } else if excluded.contains(path.as_str()) {
                    obj.insert("visible".into(), Value::String(VISIBLE_NEVER.into()));
                    stats.fields_marked_never += 1;
                }
            }
        }

        if let Some(nested) = obj.get_mut("fields").and_then(Value::as_array_mut) {
            let nested_prefix = full_path.as_deref().unwrap_or(prefix).to_string();
            mark_fields(nested, &nested_prefix, required, excluded, seen, stats);
        }
    }
}
