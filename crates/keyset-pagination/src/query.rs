//! Contract between the paginator and the query engine it drives.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::PaginationError;
use crate::types::{OrderBy, Predicate, Value};

/// A single read request issued to a [`QueryEngine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Rows must satisfy this predicate. `None` selects every row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Predicate>,
    /// Ordering the rows must be returned in.
    pub order: OrderBy,
    /// Maximum number of rows to return. `None` means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Fields to populate on each row. `None` populates all fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Vec<String>>,
    /// Engine-specific options forwarded untouched from the caller.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, JsonValue>,
}

/// A row returned by a [`QueryEngine`].
pub trait Row {
    /// Returns the value of `name`, or `None` if the row does not carry it.
    fn field(&self, name: &str) -> Option<Value>;

    /// Drops every field not listed in `fields`.
    ///
    /// Called after cursors have been extracted, when the engine was asked
    /// to include ordering fields the caller did not project. The default
    /// keeps the row unchanged.
    fn project(&mut self, fields: &[String]) {
        let _ = fields;
    }
}

/// A collection that can be filtered, ordered and limited.
///
/// Implementations must return rows in the requested order and must compare
/// values in filters consistently with that order. Errors are returned to
/// the paginator's caller unchanged, which is why the error type must be
/// able to carry a [`PaginationError`] as well.
pub trait QueryEngine: Send + Sync {
    /// Row type produced by the engine.
    type Row: Row + Send;
    /// Error type produced by the engine.
    type Error: From<PaginationError> + Send;

    /// Executes `query` and returns the matching rows in order.
    fn find_all(
        &self,
        query: Query,
    ) -> impl Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send;
}

impl<E: QueryEngine> QueryEngine for &E {
    type Row = E::Row;
    type Error = E::Error;

    fn find_all(
        &self,
        query: Query,
    ) -> impl Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send {
        (**self).find_all(query)
    }
}

impl<E: QueryEngine> QueryEngine for std::sync::Arc<E> {
    type Row = E::Row;
    type Error = E::Error;

    fn find_all(
        &self,
        query: Query,
    ) -> impl Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send {
        (**self).find_all(query)
    }
}
