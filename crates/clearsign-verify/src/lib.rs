//! # clearsign-verify
//!
//! Checks that every `display.formats` key of a contract descriptor names a
//! function that exists on the deployed contract, and proposes the closest
//! on-chain signature when it does not.
//!
//! ```text
//! Descriptor ─► plan_chains ─► Validator (ExplorerClient + ProviderRegistry) ─► ValidationReport ─► Verdict
//! ```

pub mod error;
pub mod orchestrator;
pub mod proxy;
pub mod report;
pub mod select;

pub use error::VerifyError;
pub use orchestrator::{check_key, Validator};
pub use proxy::ProxyResolution;
pub use report::{
    AddressReport, ChainOutcome, ChainReport, KeyMatch, Mismatch, Proposal, Totals, ValidationReport, Verdict,
};
pub use select::{plan_chains, ChainPlan, ChainSelection, ChainTarget};
