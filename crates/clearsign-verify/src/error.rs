//! Errors that abort a check before any explorer call is made.

use clearsign_core::DescriptorError;
use clearsign_explorer::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// Unreadable descriptor, missing context or a typed-message binding.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// No usable provider for the selected chain.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
