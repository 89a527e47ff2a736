//! # clearsign-observability
//!
//! Structured logging for the clearsign tools. Logs go to stderr so that
//! machine-readable output on stdout (`--json` reports) stays clean.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
