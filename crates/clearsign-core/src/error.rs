//! Error types shared by the clear-signing primitives.

use thiserror::Error;

/// Errors raised while parsing a human-readable function signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("no `name(...)` pattern at the head of {input:?}")]
    NoMatch { input: String },

    #[error("unbalanced parentheses in {input:?}")]
    Unbalanced { input: String },

    #[error("empty parameter at position {position} in {input:?}")]
    EmptyParameter { input: String, position: usize },
}

/// Errors raised while reading a descriptor document.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("descriptor has no `context` binding")]
    MissingContext,

    #[error("descriptor binds {found}, expected a contract binding")]
    NotContractBinding { found: &'static str },

    #[error("descriptor declares no deployments")]
    NoDeployments,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
