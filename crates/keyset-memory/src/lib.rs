#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for in-memory table operations.
///
/// Use this target for logging query evaluation and record loading.
pub const TRACING_TARGET_TABLE: &str = "keyset_memory::table";

mod error;
mod eval;
mod record;
mod table;

pub use crate::error::{MemoryError, Result};
pub use crate::record::Record;
pub use crate::table::MemoryTable;
