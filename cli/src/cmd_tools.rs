//! Small helpers: `resolve`, `selector`, `encode-type`.

use anyhow::{anyhow, Context, Result};
use clearsign_core::eip712::{type_hash, MessageSchema, TypeGraph};
use clearsign_core::{encode_type as core_encode_type, normalize, selector_of};
use clearsign_transform::IncludeResolver;
use serde_json::Value;
use std::path::Path;
use std::process::ExitCode;

pub fn resolve(file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let tree = IncludeResolver::new()
        .resolve_file(file)
        .with_context(|| format!("resolving {}", file.display()))?;
    let mut text = serde_json::to_string_pretty(&tree)?;
    text.push('\n');
    match output {
        Some(path) => std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn selector(signature: &str) -> Result<ExitCode> {
    let normalized = normalize(signature).ok_or_else(|| anyhow!("cannot parse signature {signature:?}"))?;
    println!("Normalized: {}", normalized.normalized);
    println!("Selector:   {}", selector_of(&normalized));
    Ok(ExitCode::SUCCESS)
}

pub fn encode_type(file: &Path, primary: &str) -> Result<ExitCode> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let document: Value = serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
    let types = find_types(&document, primary)
        .ok_or_else(|| anyhow!("no type schema in {} defines {primary}", file.display()))?;

    println!("{}", core_encode_type(&types, primary));
    println!("{}", type_hash(&types, primary));
    Ok(ExitCode::SUCCESS)
}

/// A bare `{ "types": … }` document, or the descriptor schema that defines `primary`.
fn find_types(document: &Value, primary: &str) -> Option<TypeGraph> {
    if let Some(types) = document.get("types") {
        return serde_json::from_value::<TypeGraph>(types.clone())
            .ok()
            .filter(|t| t.contains_key(primary));
    }
    document
        .pointer("/context/eip712/schemas")?
        .as_array()?
        .iter()
        .filter_map(MessageSchema::from_value)
        .map(|schema| schema.types)
        .find(|types| types.contains_key(primary))
}
