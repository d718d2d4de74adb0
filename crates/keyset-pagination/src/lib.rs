#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for pagination engine operations.
///
/// Use this target for logging window fetches, boundary detection and page shaping.
pub const TRACING_TARGET_ENGINE: &str = "keyset_pagination::engine";

/// Tracing target for cursor encoding and decoding.
///
/// Use this target for logging rejected or malformed cursor tokens.
pub const TRACING_TARGET_CURSOR: &str = "keyset_pagination::cursor";

mod config;
mod cursor;
mod engine;
mod error;
mod query;

pub mod range;
pub mod sql;
pub mod types;

pub use crate::config::PaginationConfig;
pub use crate::cursor::{Cursor, CursorPayload, Direction, encode_boundary};
pub use crate::engine::{
    Connection, ConnectionArgs, Edge, Page, PageArgs, PageCursors, PageInfo, Paginator,
};
pub use crate::error::{ErrorKind, PaginationError, Result};
pub use crate::query::{Query, QueryEngine, Row};
pub use crate::types::{CompareOp, OrderBy, Predicate, SortBy, SortOrder, Value};
