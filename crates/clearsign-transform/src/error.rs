//! Error types for migration and include resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while migrating one descriptor document.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The document is not written against the schema version being migrated.
    /// Batch runs report these as skipped, not failed.
    #[error("unexpected schema {found:?}, expected a first-version descriptor")]
    UnexpectedSchema { found: Option<String> },

    #[error("malformed descriptor: {reason}")]
    Malformed { reason: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while inlining included descriptors.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("included descriptor not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`includes` in {} must be a relative path string", path.display())]
    InvalidReference { path: PathBuf },

    #[error("include cycle: {}", format_chain(chain))]
    Cycle { chain: Vec<PathBuf> },

    #[error("includes nested deeper than {max} levels")]
    TooDeep { max: usize },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
