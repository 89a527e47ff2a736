//! # clearsign-core
//!
//! Pure primitives shared by every clearsign crate: the signature
//! normalizer, selector computer, EIP-712 `encodeType` builder, ABI index,
//! fuzzy matcher, and the typed descriptor model.
//!
//! Nothing here performs I/O apart from [`Descriptor::from_file`].

pub mod abi;
pub mod chain;
pub mod descriptor;
pub mod eip712;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod selector;
pub mod signature;

pub use abi::{human_readable_signature, parse_abi, AbiFunction};
pub use descriptor::{Binding, Deployment, Descriptor, FieldEntry, FormatEntry};
pub use eip712::{encode_type, MessageSchema, TypeGraph, TypedField};
pub use error::{DescriptorError, SignatureError};
pub use fuzzy::{levenshtein, Candidate, Confidence, FuzzyMatcher, MatchTarget};
pub use index::{AbiIndex, IndexedFunction};
pub use selector::{as_raw_selector, selector, selector_of};
pub use signature::{normalize, NormalizedSignature};
