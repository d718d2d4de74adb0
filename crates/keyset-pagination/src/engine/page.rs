//! Prev/next page shape.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{Paginator, WindowRequest};
use crate::cursor::{Cursor, Direction, encode_boundary};
use crate::types::{OrderBy, Predicate, SortBy};
use crate::{PaginationError, QueryEngine, Result, TRACING_TARGET_ENGINE};

/// Arguments of [`Paginator::paginate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageArgs {
    /// Caller filter, combined with the cursor range using `AND`.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Predicate>,
    /// Requested ordering. The tiebreaker field is appended when missing.
    #[serde(default)]
    pub order: OrderBy,
    /// Page size. `None` returns every remaining row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Unique tiebreaker for this request, overriding the configured primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_field: Option<String>,
    /// Cursor returned as `prevCursor` or `nextCursor` by a previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Fields to return on each row.
    #[serde(default, alias = "attributes", skip_serializing_if = "Option::is_none")]
    pub projection: Option<Vec<String>>,
    /// Any other options, forwarded to the query engine untouched.
    #[serde(flatten)]
    pub options: Map<String, JsonValue>,
}

impl PageArgs {
    /// Creates empty arguments: no filter, primary key order, no limit.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the ordering.
    pub fn with_order(mut self, order: impl IntoIterator<Item = SortBy>) -> Self {
        self.order = order.into_iter().collect();
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the tiebreaker field.
    pub fn with_pagination_field(mut self, field: impl Into<String>) -> Self {
        self.pagination_field = Some(field.into());
        self
    }

    /// Sets the cursor to resume from.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Restricts the fields returned on each row.
    pub fn with_projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an engine-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Navigation metadata of a [`Page`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageCursors {
    /// Cursor for the page before this one. `None` on an empty page.
    pub prev_cursor: Option<String>,
    /// Cursor for the page after this one. `None` on an empty page.
    pub next_cursor: Option<String>,
    /// Whether rows exist before this page.
    pub has_prev: bool,
    /// Whether rows exist after this page.
    pub has_next: bool,
}

/// A page of rows with prev/next cursors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows in the requested order.
    pub results: Vec<T>,
    /// Navigation metadata.
    pub cursors: PageCursors,
}

impl<T> Page<T> {
    /// Creates an empty page with no neighbours.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            cursors: PageCursors::default(),
        }
    }

    /// Returns the number of rows on this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns whether this page has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Maps the rows to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            results: self.results.into_iter().map(f).collect(),
            cursors: self.cursors,
        }
    }
}

impl<E: QueryEngine> Paginator<E> {
    /// Returns one page of rows with prev/next cursors.
    ///
    /// Without a cursor the page starts at the first row. A `nextCursor`
    /// resumes strictly after the last row of the page it came from, a
    /// `prevCursor` strictly before the first row.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_ENGINE,
        fields(method = %self.config.method_name, limit = ?args.limit)
    )]
    pub async fn paginate(&self, args: PageArgs) -> Result<Page<E::Row>, E::Error> {
        let order = self.normalize(&args.order, args.pagination_field.as_deref());
        let boundary = match args.cursor.as_deref() {
            Some(token) => Some(self.decode_page_cursor(token, &order)?),
            None => None,
        };
        let direction = boundary.as_ref().map(|(_, direction)| *direction);

        let window = self
            .fetch_window(WindowRequest {
                filter: args.filter,
                order,
                boundary,
                limit: args.limit,
                projection: args.projection,
                options: args.options,
            })
            .await?;

        let (has_prev, has_next) = match direction {
            None => (false, window.has_more),
            Some(Direction::Next) => (true, window.has_more),
            Some(Direction::Prev) => (window.has_more, true),
        };

        let first = window.entries.first().map(|(_, values)| values.as_slice());
        let last = window.entries.last().map(|(_, values)| values.as_slice());
        let prev_cursor = encode_boundary(first, Some(Direction::Prev))?;
        let next_cursor = encode_boundary(last, Some(Direction::Next))?;

        Ok(Page {
            results: window.entries.into_iter().map(|(row, _)| row).collect(),
            cursors: PageCursors {
                prev_cursor,
                next_cursor,
                has_prev,
                has_next,
            },
        })
    }

    fn decode_page_cursor(
        &self,
        token: &str,
        order: &OrderBy,
    ) -> Result<(Vec<crate::Value>, Direction)> {
        let cursor = Cursor::decode(token)?;
        let direction = match cursor.direction {
            Some(direction) => direction,
            None if self.config.legacy_cursors => Direction::Next,
            None => return Err(PaginationError::LegacyCursor),
        };
        cursor.ensure_matches(order)?;
        Ok((cursor.values, direction))
    }
}
