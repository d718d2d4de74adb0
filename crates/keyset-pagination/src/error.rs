//! Error types for pagination operations.

use std::borrow::Cow;

use strum::{AsRefStr, IntoStaticStr};

/// Type-erased error type used as the source of decode failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Categories of errors produced by this crate.
///
/// Errors raised by the query engine are not categorized here, they are
/// returned to the caller as the engine produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Incompatible or out-of-range pagination arguments.
    Usage,
    /// The cursor token could not be decoded.
    Decode,
    /// A boundary value could not be encoded.
    Encode,
    /// The cursor does not match the active ordering.
    IncompatibleCursor,
    /// A row returned by the engine lacks an ordering field.
    MissingField,
    /// An identifier cannot be safely rendered as SQL.
    InvalidIdentifier,
}

/// Error type for cursor handling and page construction.
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum PaginationError {
    /// Pagination arguments cannot be combined or are out of range.
    ///
    /// Raised for `first`/`after` mixed with `last`/`before`, `last` without
    /// `before`, and negative page sizes.
    #[error("Invalid pagination arguments: {0}")]
    InvalidArguments(Cow<'static, str>),

    /// The cursor token is not valid under the encoding scheme.
    #[error("Invalid cursor: {reason}")]
    InvalidCursor {
        /// Which decoding stage rejected the token.
        reason: &'static str,
        /// Underlying decoder error.
        #[source]
        source: BoxError,
    },

    /// A bare-array cursor was given while legacy cursors are disabled.
    #[error("Legacy cursor format is not accepted by this paginator")]
    LegacyCursor,

    /// The cursor tuple length differs from the normalized ordering.
    #[error("Cursor does not match query: expected {expected} values, found {found}")]
    IncompatibleCursor {
        /// Number of fields in the normalized ordering.
        expected: usize,
        /// Number of values carried by the cursor.
        found: usize,
    },

    /// A row returned by the query engine does not expose an ordering field.
    #[error("Row is missing ordering field `{0}`")]
    MissingField(String),

    /// A cursor payload failed to serialize.
    #[error("Failed to encode cursor: {0}")]
    Encode(#[from] serde_json::Error),

    /// A float boundary value is NaN or infinite and cannot round-trip.
    #[error("Cannot encode non-finite float at cursor position {0}")]
    NonFiniteFloat(usize),

    /// An identifier contains characters that cannot be rendered as SQL.
    #[error("Invalid identifier: `{0}`")]
    InvalidIdentifier(String),
}

impl PaginationError {
    /// Creates an invalid arguments error with the given message.
    pub fn invalid_arguments(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Creates an invalid cursor error from a decoder failure.
    pub fn invalid_cursor(
        reason: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidCursor {
            reason,
            source: Box::new(source),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::Usage,
            Self::InvalidCursor { .. } | Self::LegacyCursor => ErrorKind::Decode,
            Self::IncompatibleCursor { .. } => ErrorKind::IncompatibleCursor,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::Encode(_) | Self::NonFiniteFloat(_) => ErrorKind::Encode,
            Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
        }
    }

    /// Returns whether the caller supplied arguments or a cursor that can never succeed.
    ///
    /// Usage errors are not worth retrying: the same request fails the same way.
    pub fn is_usage(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Usage | ErrorKind::Decode | ErrorKind::IncompatibleCursor
        )
    }
}

/// Specialized [`Result`] type for pagination operations.
pub type Result<T, E = PaginationError> = std::result::Result<T, E>;
