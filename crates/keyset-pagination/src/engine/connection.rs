//! Relay-style connection shape.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{Paginator, WindowRequest};
use crate::cursor::{Cursor, Direction};
use crate::types::{OrderBy, Predicate, SortBy};
use crate::{PaginationError, QueryEngine, Result, TRACING_TARGET_ENGINE};

/// Arguments of [`Paginator::paginate_connection`].
///
/// `first`/`after` page forward and `last`/`before` page backward; the two
/// groups cannot be mixed in one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionArgs {
    /// Caller filter, combined with the cursor range using `AND`.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Predicate>,
    /// Requested ordering. The tiebreaker field is appended when missing.
    #[serde(default)]
    pub order: OrderBy,
    /// Number of edges after `after`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<i64>,
    /// Edge cursor to page forward from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Number of edges before `before`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<i64>,
    /// Edge cursor to page backward from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Unique tiebreaker for this request, overriding the configured primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_field: Option<String>,
    /// Fields to return on each node.
    #[serde(default, alias = "attributes", skip_serializing_if = "Option::is_none")]
    pub projection: Option<Vec<String>>,
    /// Any other options, forwarded to the query engine untouched.
    #[serde(flatten)]
    pub options: Map<String, JsonValue>,
}

impl ConnectionArgs {
    /// Creates empty arguments.
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

    /// Requests the first `count` edges.
    pub fn with_first(mut self, count: i64) -> Self {
        self.first = Some(count);
        self
    }

    /// Pages forward from an edge cursor.
    pub fn with_after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Requests the last `count` edges.
    pub fn with_last(mut self, count: i64) -> Self {
        self.last = Some(count);
        self
    }

    /// Pages backward from an edge cursor.
    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Sets the tiebreaker field.
    pub fn with_pagination_field(mut self, field: impl Into<String>) -> Self {
        self.pagination_field = Some(field.into());
        self
    }

    /// Restricts the fields returned on each node.
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

    /// Checks that the arguments describe a single traversal.
    pub fn validate(&self) -> Result<()> {
        let forward = self.first.is_some() || self.after.is_some();
        let backward = self.last.is_some() || self.before.is_some();
        if forward && backward {
            return Err(PaginationError::invalid_arguments(
                "first/after cannot be combined with last/before",
            ));
        }

        if self.first.is_some_and(|first| first < 0) {
            return Err(PaginationError::invalid_arguments(
                "first cannot be negative",
            ));
        }

        if self.last.is_some_and(|last| last < 0) {
            return Err(PaginationError::invalid_arguments(
                "last cannot be negative",
            ));
        }

        if self.last.is_some() && self.before.is_none() {
            return Err(PaginationError::invalid_arguments(
                "last requires a before cursor",
            ));
        }

        Ok(())
    }

    /// Returns the boundary cursor and the direction it is walked in.
    fn boundary(&self) -> Option<(&str, Direction)> {
        match (&self.after, &self.before) {
            (Some(after), _) => Some((after.as_str(), Direction::Next)),
            (None, Some(before)) => Some((before.as_str(), Direction::Prev)),
            (None, None) => None,
        }
    }
}

/// A node together with the cursor that points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Edge<T> {
    /// Cursor of this node, usable as `after` or `before`.
    pub cursor: String,
    /// The row.
    pub node: T,
}

/// Navigation metadata of a [`Connection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Cursor of the first edge.
    pub start_cursor: Option<String>,
    /// Cursor of the last edge.
    pub end_cursor: Option<String>,
    /// Whether edges exist before the first one.
    pub has_previous_page: bool,
    /// Whether edges exist after the last one.
    pub has_next_page: bool,
}

/// A page of edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// Edges in the requested order.
    pub edges: Vec<Edge<T>>,
    /// Navigation metadata.
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Returns the nodes without their cursors.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }

    /// Maps the nodes to a different type, keeping the cursors.
    pub fn map<U, F>(self, mut f: F) -> Connection<U>
    where
        F: FnMut(T) -> U,
    {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|edge| Edge {
                    cursor: edge.cursor,
                    node: f(edge.node),
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

impl<E: QueryEngine> Paginator<E> {
    /// Returns one page of edges in the connection shape.
    ///
    /// Edge cursors carry no direction: the same cursor works as `after`
    /// and as `before`. Cursors that do carry one are accepted and the
    /// stored direction is ignored.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_ENGINE,
        fields(method = %self.config.method_name, first = ?args.first, last = ?args.last)
    )]
    pub async fn paginate_connection(
        &self,
        args: ConnectionArgs,
    ) -> Result<Connection<E::Row>, E::Error> {
        args.validate()?;

        let order = self.normalize(&args.order, args.pagination_field.as_deref());
        let boundary = match args.boundary() {
            Some((token, direction)) => {
                let cursor = Cursor::decode(token)?;
                cursor.ensure_matches(&order)?;
                Some((cursor.values, direction))
            }
            None => None,
        };
        let direction = boundary.as_ref().map(|(_, direction)| *direction);

        let limit = match direction {
            Some(Direction::Prev) => args.last,
            _ => args.first,
        };
        // Negative counts were rejected above.
        let limit = limit.map(|count| count.unsigned_abs());

        let window = self
            .fetch_window(WindowRequest {
                filter: args.filter,
                order,
                boundary,
                limit,
                projection: args.projection,
                options: args.options,
            })
            .await?;

        let (has_previous_page, has_next_page) = match direction {
            None => (false, window.has_more),
            Some(Direction::Next) => (true, window.has_more),
            Some(Direction::Prev) => (window.has_more, true),
        };

        let edges = window
            .entries
            .into_iter()
            .map(|(node, values)| {
                let cursor = Cursor::bare(values).encode()?;
                Ok(Edge { cursor, node })
            })
            .collect::<Result<Vec<_>>>()?;

        let page_info = PageInfo {
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
            has_previous_page,
            has_next_page,
        };

        Ok(Connection { edges, page_info })
    }
}
