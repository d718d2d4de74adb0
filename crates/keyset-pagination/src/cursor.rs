//! Opaque cursor tokens.
//!
//! A cursor is the sort key of a boundary row, plus the direction the next
//! request should walk. It is serialized to JSON and encoded as URL-safe
//! base64 without padding. Callers must treat the token as opaque; only
//! equality and round-trip decoding are guaranteed.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PaginationError, Result};
use crate::types::{OrderBy, Value};
use crate::{Row, TRACING_TARGET_CURSOR};

/// Direction a cursor resumes in, relative to the requested ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Rows strictly after the boundary.
    Next,
    /// Rows strictly before the boundary.
    Prev,
}

impl Direction {
    /// Returns the lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

/// Wire shape of a cursor payload.
///
/// A JSON array and a JSON object can never be confused, so both shapes
/// are accepted by a single decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorPayload {
    /// Bare tuple of values, used by the connection API and by older tokens.
    Bare(Vec<Value>),
    /// Tuple of values with the direction the token resumes in.
    Tagged {
        /// Boundary values, one per ordering field.
        values: Vec<Value>,
        /// Direction to resume in.
        direction: Direction,
    },
}

/// Decoded cursor.
///
/// `direction` is `None` when the token was a bare tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    /// Boundary values, one per ordering field.
    pub values: Vec<Value>,
    /// Direction to resume in, if the token carried one.
    pub direction: Option<Direction>,
}

impl Cursor {
    /// Creates a cursor carrying a direction.
    pub fn new(values: Vec<Value>, direction: Direction) -> Self {
        Self {
            values,
            direction: Some(direction),
        }
    }

    /// Creates a direction-less cursor.
    pub fn bare(values: Vec<Value>) -> Self {
        Self {
            values,
            direction: None,
        }
    }

    /// Returns the wire payload for this cursor.
    pub fn to_payload(&self) -> CursorPayload {
        match self.direction {
            Some(direction) => CursorPayload::Tagged {
                values: self.values.clone(),
                direction,
            },
            None => CursorPayload::Bare(self.values.clone()),
        }
    }

    /// Encodes the cursor as a URL-safe base64 string.
    ///
    /// Fails for non-finite floats, which JSON cannot carry losslessly.
    pub fn encode(&self) -> Result<String> {
        if let Some(index) = self
            .values
            .iter()
            .position(|value| matches!(value, Value::Float(f) if !f.is_finite()))
        {
            return Err(PaginationError::NonFiniteFloat(index));
        }

        let json = serde_json::to_vec(&self.to_payload())?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes a cursor from a URL-safe base64 string.
    ///
    /// A malformed token is an error rather than "no cursor": silently
    /// restarting from the first page would hide corrupted tokens.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(encoded).map_err(|error| {
            tracing::debug!(target: TRACING_TARGET_CURSOR, %error, "cursor is not base64");
            PaginationError::invalid_cursor("not url-safe base64", error)
        })?;

        let payload: CursorPayload = serde_json::from_slice(&bytes).map_err(|error| {
            tracing::debug!(target: TRACING_TARGET_CURSOR, %error, "cursor payload is malformed");
            PaginationError::invalid_cursor("malformed payload", error)
        })?;

        Ok(payload.into())
    }

    /// Checks that the cursor carries one value per ordering field.
    pub fn ensure_matches(&self, order: &OrderBy) -> Result<()> {
        if self.values.len() != order.len() {
            return Err(PaginationError::IncompatibleCursor {
                expected: order.len(),
                found: self.values.len(),
            });
        }
        Ok(())
    }
}

impl From<CursorPayload> for Cursor {
    fn from(payload: CursorPayload) -> Self {
        match payload {
            CursorPayload::Bare(values) => Self::bare(values),
            CursorPayload::Tagged { values, direction } => Self::new(values, direction),
        }
    }
}

/// Extracts the sort key of `row` under `order`.
pub(crate) fn row_values<R: Row>(order: &OrderBy, row: &R) -> Result<Vec<Value>> {
    order
        .fields()
        .map(|field| {
            row.field(field)
                .ok_or_else(|| PaginationError::MissingField(field.to_owned()))
        })
        .collect()
}

/// Encodes the cursor for the first or last row of a page.
///
/// `values` is that row's sort key. Returns `Ok(None)` when there is no
/// boundary row, i.e. the page is empty.
pub fn encode_boundary(
    values: Option<&[Value]>,
    direction: Option<Direction>,
) -> Result<Option<String>> {
    let Some(values) = values else {
        return Ok(None);
    };

    let cursor = Cursor {
        values: values.to_vec(),
        direction,
    };
    cursor.encode().map(Some)
}
