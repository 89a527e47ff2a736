//! # clearsign-transform
//!
//! Side-effect-free rewrites of descriptor trees:
//!
//! - [`migrate`]: ordered, idempotent first → second schema version rules
//! - [`include`]: recursive `includes` resolution
//! - [`merge`]: the key → policy table both of them build on
//! - [`batch`]: file-level migration with per-file error isolation
//!
//! Every operation returns a new tree plus its own statistics; nothing here
//! keeps process-wide state.

pub mod batch;
pub mod error;
pub mod include;
pub mod merge;
pub mod migrate;
pub mod tree;

pub use batch::{BatchMigrator, BatchReport, FileOutcome, FileReport};
pub use error::{IncludeError, MigrateError};
pub use include::{DescriptorSource, FsSource, IncludeResolver};
pub use merge::{MergePolicy, MergeRules};
pub use migrate::{migrate, migrate_document, Migration, MigrationStats, Rule, RULES};
