//! Pagination engine.
//!
//! Every request runs the same pipeline against one query:
//!
//! ```text
//! decode → normalize order → flip (backward only) → range predicate
//!        → query limit+1 → detect more → trim → reverse (backward only)
//!        → encode boundary cursors → shape response
//! ```
//!
//! Walking backward is a forward query over the inverted ordering: the rows
//! nearest to the boundary come first, and the trimmed slice is reversed
//! back into the requested order before it is returned.

mod connection;
mod page;

pub use connection::{Connection, ConnectionArgs, Edge, PageInfo};
pub use page::{Page, PageArgs, PageCursors};
use serde_json::{Map, Value as JsonValue};

use crate::cursor::{Direction, row_values};
use crate::types::{OrderBy, Predicate, Value};
use crate::{PaginationConfig, Query, QueryEngine, Result, Row, TRACING_TARGET_ENGINE, range};

/// Cursor pagination bound to a query engine.
///
/// The paginator holds no per-request state: every call decodes its cursor,
/// issues exactly one query and derives fresh cursors from the rows it got
/// back. Concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct Paginator<E> {
    engine: E,
    config: PaginationConfig,
}

impl<E> Paginator<E> {
    /// Creates a paginator with a validated configuration.
    pub fn new(engine: E, config: PaginationConfig) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            method = %config.method_name,
            primary_key = %config.primary_key_field,
            legacy_cursors = config.legacy_cursors,
            "Created paginator"
        );

        Ok(Self { engine, config })
    }

    /// Creates a paginator with the default configuration.
    pub fn with_defaults(engine: E) -> Self {
        Self {
            engine,
            config: PaginationConfig::default(),
        }
    }

    /// Returns the name the pagination operation is installed under.
    #[inline]
    pub fn method_name(&self) -> &str {
        &self.config.method_name
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Returns the underlying query engine.
    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the ordering the query actually runs with.
    fn normalize(&self, order: &OrderBy, pagination_field: Option<&str>) -> OrderBy {
        let tiebreaker = pagination_field.unwrap_or(&self.config.primary_key_field);
        order.normalized(tiebreaker)
    }
}

/// One window fetch, shared by both response shapes.
struct WindowRequest {
    filter: Option<Predicate>,
    /// Normalized ordering in the caller's logical direction.
    order: OrderBy,
    boundary: Option<(Vec<Value>, Direction)>,
    limit: Option<u64>,
    projection: Option<Vec<String>>,
    options: Map<String, JsonValue>,
}

/// Rows of one page, in logical order, each with its sort key.
struct Window<R> {
    entries: Vec<(R, Vec<Value>)>,
    has_more: bool,
}

impl<E: QueryEngine> Paginator<E> {
    async fn fetch_window(&self, request: WindowRequest) -> Result<Window<E::Row>, E::Error> {
        let WindowRequest {
            filter,
            order,
            boundary,
            limit,
            projection,
            options,
        } = request;

        let direction = boundary.as_ref().map(|(_, direction)| *direction);
        let query_order = match direction {
            Some(Direction::Prev) => order.reversed(),
            _ => order.clone(),
        };

        let filter = match &boundary {
            Some((values, _)) => {
                let range = range::after(&query_order, values)?;
                Some(match filter {
                    Some(filter) => Predicate::And(vec![filter, range]),
                    None => range,
                })
            }
            None => filter,
        };

        // Ordering fields are always fetched so cursors can be built, then
        // stripped again if the caller did not ask for them.
        let (query_projection, strip) = match &projection {
            Some(fields) => {
                let mut widened = fields.clone();
                for field in order.fields() {
                    if !widened.iter().any(|f| f == field) {
                        widened.push(field.to_owned());
                    }
                }
                let strip = widened.len() != fields.len();
                (Some(widened), strip)
            }
            None => (None, false),
        };

        let query = Query {
            filter,
            order: query_order,
            limit: limit.map(|limit| limit.saturating_add(1)),
            projection: query_projection,
            options,
        };

        let mut rows = self.engine.find_all(query).await?;
        let fetched = rows.len();

        let has_more = limit.is_some_and(|limit| fetched as u64 > limit);
        if let Some(limit) = limit
            && has_more
        {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        if direction == Some(Direction::Prev) {
            rows.reverse();
        }

        let mut entries = Vec::with_capacity(rows.len());
        for mut row in rows {
            let values = row_values(&order, &row)?;
            if strip && let Some(fields) = &projection {
                row.project(fields);
            }
            entries.push((row, values));
        }

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            method = %self.config.method_name,
            direction = direction.map_or("start", Direction::as_str),
            limit = ?limit,
            fetched,
            has_more,
            "Fetched page window"
        );

        Ok(Window { entries, has_more })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::PaginationError;

    /// Row used by the recording engine.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct TestRow(pub BTreeMap<String, Value>);

    impl TestRow {
        pub(crate) fn new(id: i64, extra1: i64) -> Self {
            Self(BTreeMap::from([
                ("id".to_owned(), Value::Int(id)),
                ("extra1".to_owned(), Value::Int(extra1)),
            ]))
        }

        pub(crate) fn id(&self) -> i64 {
            self.0.get("id").and_then(Value::as_int).unwrap_or_default()
        }
    }

    impl Row for TestRow {
        fn field(&self, name: &str) -> Option<Value> {
            self.0.get(name).cloned()
        }

        fn project(&mut self, fields: &[String]) {
            self.0.retain(|name, _| fields.contains(name));
        }
    }

    #[derive(Debug, thiserror::Error)]
    pub(crate) enum TestError {
        #[error(transparent)]
        Pagination(#[from] PaginationError),
        #[error("engine unavailable")]
        Unavailable,
    }

    /// Returns canned rows and records every query it receives.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingEngine {
        pub(crate) rows: Vec<TestRow>,
        pub(crate) fail: bool,
        pub(crate) queries: Mutex<Vec<Query>>,
    }

    impl RecordingEngine {
        pub(crate) fn returning(rows: Vec<TestRow>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        pub(crate) fn last_query(&self) -> Query {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl QueryEngine for RecordingEngine {
        type Error = TestError;
        type Row = TestRow;

        async fn find_all(&self, query: Query) -> Result<Vec<TestRow>, TestError> {
            let limit = query.limit;
            self.queries.lock().unwrap().push(query);
            if self.fail {
                return Err(TestError::Unavailable);
            }
            let take = limit.map_or(usize::MAX, |limit| {
                usize::try_from(limit).unwrap_or(usize::MAX)
            });
            Ok(self.rows.iter().take(take).cloned().collect())
        }
    }

    #[test]
    fn new_validates_config() {
        let config = PaginationConfig::default().with_primary_key_field("");
        assert!(Paginator::new(RecordingEngine::default(), config).is_err());
    }

    #[test]
    fn default_method_name() {
        let paginator = Paginator::with_defaults(RecordingEngine::default());
        assert_eq!(paginator.method_name(), "paginate");

        let config = PaginationConfig::default().with_method_name("page");
        let paginator = Paginator::new(RecordingEngine::default(), config).unwrap();
        assert_eq!(paginator.method_name(), "page");
    }

    #[tokio::test]
    async fn projection_is_widened_then_stripped() {
        let engine = RecordingEngine::returning(vec![TestRow::new(1, 3), TestRow::new(2, 1)]);
        let paginator = Paginator::with_defaults(&engine);

        let request = WindowRequest {
            filter: None,
            order: OrderBy::new(vec![crate::SortBy::asc("extra1")]).normalized("id"),
            boundary: None,
            limit: Some(5),
            projection: Some(vec!["id".to_owned()]),
            options: Map::new(),
        };
        let window = paginator.fetch_window(request).await.unwrap();

        assert_eq!(
            engine.last_query().projection,
            Some(vec!["id".to_owned(), "extra1".to_owned()])
        );
        let (row, values) = &window.entries[0];
        assert_eq!(row.field("extra1"), None);
        assert_eq!(values, &vec![Value::Int(3), Value::Int(1)]);
    }

    #[tokio::test]
    async fn max_limit_keeps_every_row() {
        let engine = RecordingEngine::returning(vec![TestRow::new(1, 3), TestRow::new(2, 1)]);
        let paginator = Paginator::with_defaults(&engine);

        let page = paginator
            .paginate(PageArgs::new().with_limit(u64::MAX))
            .await
            .unwrap();

        assert_eq!(engine.last_query().limit, Some(u64::MAX));
        assert_eq!(page.len(), 2);
        assert!(!page.cursors.has_next);
    }

    #[tokio::test]
    async fn engine_errors_pass_through() {
        let engine = RecordingEngine {
            fail: true,
            ..RecordingEngine::default()
        };
        let paginator = Paginator::with_defaults(&engine);
        let error = paginator
            .paginate(PageArgs::new().with_limit(2))
            .await
            .unwrap_err();
        assert!(matches!(error, TestError::Unavailable));
    }
}
