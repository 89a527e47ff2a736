//! Read-only lookup tables over a contract's ABI functions.
//!
//! Built fresh for every contract/chain lookup and never mutated afterwards.
//! All tables preserve construction order, which the fuzzy matcher relies on
//! to break score ties deterministically.

use indexmap::IndexMap;

use crate::abi::{human_readable_signature, AbiFunction};
use crate::selector::selector_of;
use crate::signature::{normalize, NormalizedSignature};

/// An ABI function with its derived signature forms.
#[derive(Debug, Clone)]
pub struct IndexedFunction {
    pub entry: AbiFunction,
    /// Human-readable signature with parameter names
    pub signature: String,
    pub normalized: NormalizedSignature,
    /// `0x`-prefixed 4-byte selector
    pub selector: String,
}

/// Lookup tables over a set of ABI functions.
#[derive(Debug, Clone, Default)]
pub struct AbiIndex {
    functions: Vec<IndexedFunction>,
    by_signature: IndexMap<String, usize>,
    by_selector: IndexMap<String, Vec<usize>>,
    by_types: IndexMap<String, Vec<usize>>,
    by_name: IndexMap<String, Vec<usize>>,
}

impl AbiIndex {
    /// Build an index over `entries`.
    ///
    /// Functions whose signature cannot be normalized are skipped;
    /// construction never fails.
    pub fn new(entries: impl IntoIterator<Item = AbiFunction>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            let signature = human_readable_signature(&entry);
            let Some(normalized) = normalize(&signature) else {
                tracing::debug!(%signature, "skipping ABI function with unparseable signature");
                continue;
            };
            let selector = selector_of(&normalized);
            let pos = index.functions.len();

            index.by_signature.entry(normalized.normalized.clone()).or_insert(pos);
            index.by_selector.entry(selector.clone()).or_default().push(pos);
            index.by_types.entry(normalized.types_key.clone()).or_default().push(pos);
            index.by_name.entry(normalized.name.clone()).or_default().push(pos);

            index.functions.push(IndexedFunction {
                entry,
                signature,
                normalized,
                selector,
            });
        }
        index
    }

    /// Build from a raw JSON ABI (array or embedded string).
    pub fn from_json(abi: &serde_json::Value) -> Self {
        Self::new(crate::abi::parse_abi(abi))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All functions, in construction order.
    pub fn functions(&self) -> &[IndexedFunction] {
        &self.functions
    }

    /// Exact lookup by normalized signature.
    pub fn get(&self, normalized: &str) -> Option<&IndexedFunction> {
        self.by_signature.get(normalized).map(|&i| &self.functions[i])
    }

    /// Functions whose selector equals `selector` (lowercase `0x` hex).
    pub fn by_selector(&self, selector: &str) -> Vec<&IndexedFunction> {
        self.positions(self.by_selector.get(selector))
    }

    /// Functions with exactly this `(type1,type2,...)` parameter list.
    pub fn by_types(&self, types_key: &str) -> Vec<&IndexedFunction> {
        self.positions(self.by_types.get(types_key))
    }

    /// Functions (overloads included) named `name`.
    pub fn by_name(&self, name: &str) -> Vec<&IndexedFunction> {
        self.positions(self.by_name.get(name))
    }

    fn positions(&self, slots: Option<&Vec<usize>>) -> Vec<&IndexedFunction> {
        slots
            .map(|v| v.iter().map(|&i| &self.functions[i]).collect())
            .unwrap_or_default()
    }
}
