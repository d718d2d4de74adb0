//! Error types for the in-memory engine.

use keyset_pagination::PaginationError;

/// Error type for [`MemoryTable`] and record loading.
///
/// [`MemoryTable`]: crate::MemoryTable
#[derive(Debug, thiserror::Error)]
#[must_use = "memory engine errors should be handled appropriately"]
pub enum MemoryError {
    /// Pagination failed before or after the table was queried.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// A JSON document is not an object.
    #[error("Expected a JSON object for a record, found {0}")]
    NotAnObject(&'static str),

    /// A JSON column holds a value with no scalar counterpart.
    #[error("Column `{column}` holds unsupported JSON {kind}")]
    UnsupportedValue {
        /// Column name.
        column: String,
        /// JSON type found.
        kind: &'static str,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Specialized [`Result`] type for the in-memory engine.
pub type Result<T, E = MemoryError> = std::result::Result<T, E>;
