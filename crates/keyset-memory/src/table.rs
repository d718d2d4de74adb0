//! In-memory table implementing [`QueryEngine`].

use keyset_pagination::{Query, QueryEngine, Row};
use tokio::sync::RwLock;

use crate::eval::{cmp_rows, matches};
use crate::{MemoryError, Record, TRACING_TARGET_TABLE};

/// A list of records queried with SQL-like semantics.
///
/// Reads take a shared lock, so concurrent paginations never block each
/// other; inserts wait for in-flight reads to finish.
#[derive(Debug, Default)]
pub struct MemoryTable {
    records: RwLock<Vec<Record>>,
}

impl MemoryTable {
    /// Creates an empty table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding `records`.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Appends a record.
    pub async fn insert(&self, record: Record) {
        self.records.write().await.push(record);
    }

    /// Appends several records.
    pub async fn extend(&self, records: impl IntoIterator<Item = Record>) {
        self.records.write().await.extend(records);
    }

    /// Returns the number of records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether the table has no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl QueryEngine for MemoryTable {
    type Error = MemoryError;
    type Row = Record;

    async fn find_all(&self, query: Query) -> Result<Vec<Record>, MemoryError> {
        let records = self.records.read().await;

        let mut selected: Vec<Record> = match &query.filter {
            Some(filter) => records
                .iter()
                .filter(|record| matches(filter, *record))
                .cloned()
                .collect(),
            None => records.clone(),
        };
        let scanned = records.len();
        drop(records);

        selected.sort_by(|a, b| cmp_rows(&query.order, a, b));

        if let Some(limit) = query.limit {
            selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        if let Some(fields) = &query.projection {
            for record in &mut selected {
                record.project(fields);
            }
        }

        if !query.options.is_empty() {
            tracing::trace!(
                target: TRACING_TARGET_TABLE,
                options = ?query.options.keys().collect::<Vec<_>>(),
                "Ignoring engine options"
            );
        }

        tracing::debug!(
            target: TRACING_TARGET_TABLE,
            scanned,
            returned = selected.len(),
            limit = ?query.limit,
            "Evaluated query"
        );

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::Timestamp;
    use keyset_pagination::{
        Connection, ConnectionArgs, Page, PageArgs, PaginationConfig, PaginationError, Paginator,
        Predicate, SortBy, Value,
    };

    use super::*;

    /// Five rows with a non-unique `extra2` column.
    fn fixture() -> MemoryTable {
        MemoryTable::from_records(
            [(1, 3, 2), (2, 1, 3), (3, 2, 3), (4, 5, 3), (5, 4, 2)].map(|(id, extra1, extra2)| {
                Record::new()
                    .set("id", id)
                    .set("extra1", extra1)
                    .set("extra2", extra2)
            }),
        )
    }

    fn ids(page: &Page<Record>) -> Vec<i64> {
        page.results
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_int))
            .collect()
    }

    fn edge_ids(connection: &Connection<Record>) -> Vec<i64> {
        connection
            .nodes()
            .filter_map(|record| record.get("id").and_then(Value::as_int))
            .collect()
    }

    fn flags(page: &Page<Record>) -> (bool, bool) {
        (page.cursors.has_prev, page.cursors.has_next)
    }

    /// Walks three pages forward, then two back, checking ids and flags.
    async fn walk(order: Vec<SortBy>, expected: [&[i64]; 3]) {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);
        let args = || PageArgs::new().with_order(order.clone()).with_limit(2);

        let first = paginator.paginate(args()).await.unwrap();
        assert_eq!(ids(&first), expected[0]);
        assert_eq!(flags(&first), (false, true));

        let cursor = first.cursors.next_cursor.clone().unwrap();
        let second = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&second), expected[1]);
        assert_eq!(flags(&second), (true, true));

        let cursor = second.cursors.next_cursor.clone().unwrap();
        let third = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&third), expected[2]);
        assert_eq!(flags(&third), (true, false));
        assert!(third.cursors.prev_cursor.is_some());
        assert!(third.cursors.next_cursor.is_some());

        let cursor = third.cursors.prev_cursor.clone().unwrap();
        let back = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&back), expected[1]);
        assert_eq!(flags(&back), (true, true));

        let cursor = back.cursors.prev_cursor.clone().unwrap();
        let start = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&start), expected[0]);
        assert_eq!(flags(&start), (false, true));
    }

    /// Same walk through the connection shape.
    async fn walk_connection(order: Vec<SortBy>, expected: [&[i64]; 3]) {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);
        let args = || ConnectionArgs::new().with_order(order.clone());
        let info = |c: &Connection<Record>| (c.page_info.has_previous_page, c.page_info.has_next_page);

        let first = paginator
            .paginate_connection(args().with_first(2))
            .await
            .unwrap();
        assert_eq!(edge_ids(&first), expected[0]);
        assert_eq!(info(&first), (false, true));

        let end = first.page_info.end_cursor.clone().unwrap();
        let second = paginator
            .paginate_connection(args().with_first(2).with_after(end))
            .await
            .unwrap();
        assert_eq!(edge_ids(&second), expected[1]);
        assert_eq!(info(&second), (true, true));

        let end = second.page_info.end_cursor.clone().unwrap();
        let third = paginator
            .paginate_connection(args().with_first(2).with_after(end))
            .await
            .unwrap();
        assert_eq!(edge_ids(&third), expected[2]);
        assert_eq!(info(&third), (true, false));

        let start = third.page_info.start_cursor.clone().unwrap();
        let back = paginator
            .paginate_connection(args().with_last(2).with_before(start))
            .await
            .unwrap();
        assert_eq!(edge_ids(&back), expected[1]);
        assert_eq!(info(&back), (true, true));

        let start = back.page_info.start_cursor.clone().unwrap();
        let origin = paginator
            .paginate_connection(args().with_last(2).with_before(start))
            .await
            .unwrap();
        assert_eq!(edge_ids(&origin), expected[0]);
        assert_eq!(info(&origin), (false, true));
    }

    #[tokio::test]
    async fn primary_key_ascending() {
        walk(vec![], [&[1, 2], &[3, 4], &[5]]).await;
        walk_connection(vec![], [&[1, 2], &[3, 4], &[5]]).await;
    }

    #[tokio::test]
    async fn non_primary_key_ascending() {
        let order = vec![SortBy::asc("extra1")];
        walk(order.clone(), [&[2, 3], &[1, 5], &[4]]).await;
        walk_connection(order, [&[2, 3], &[1, 5], &[4]]).await;
    }

    #[tokio::test]
    async fn primary_key_descending() {
        let order = vec![SortBy::desc("id")];
        walk(order.clone(), [&[5, 4], &[3, 2], &[1]]).await;
        walk_connection(order, [&[5, 4], &[3, 2], &[1]]).await;
    }

    #[tokio::test]
    async fn non_primary_key_descending() {
        let order = vec![SortBy::desc("extra1")];
        walk(order.clone(), [&[4, 5], &[1, 3], &[2]]).await;
        walk_connection(order, [&[4, 5], &[1, 3], &[2]]).await;
    }

    #[tokio::test]
    async fn non_unique_field_ascending() {
        let order = vec![SortBy::asc("extra2")];
        walk(order.clone(), [&[1, 5], &[2, 3], &[4]]).await;
        walk_connection(order, [&[1, 5], &[2, 3], &[4]]).await;
    }

    #[tokio::test]
    async fn non_unique_field_descending() {
        let order = vec![SortBy::desc("extra2")];
        walk(order.clone(), [&[2, 3], &[4, 1], &[5]]).await;
        walk_connection(order, [&[2, 3], &[4, 1], &[5]]).await;
    }

    #[tokio::test]
    async fn mixed_directions() {
        // extra2 DESC, then extra1 ASC: (3:1,2,5) then (2:3,4).
        let order = vec![SortBy::desc("extra2"), SortBy::asc("extra1")];
        walk(order, [&[2, 3], &[4, 1], &[5]]).await;
    }

    #[tokio::test]
    async fn projection_hides_ordering_fields() {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);
        let args = || {
            PageArgs::new()
                .with_order([SortBy::asc("extra1")])
                .with_limit(2)
                .with_projection(["id"])
        };

        let first = paginator.paginate(args()).await.unwrap();
        assert_eq!(ids(&first), [2, 3]);
        assert!(first.results.iter().all(|record| record.get("extra1").is_none()));

        let cursor = first.cursors.next_cursor.clone().unwrap();
        let second = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&second), [1, 5]);
        assert!(second.results.iter().all(|record| record.columns.len() == 1));
    }

    #[tokio::test]
    async fn connection_projection_hides_ordering_fields() {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);
        let args = || {
            ConnectionArgs::new()
                .with_order([SortBy::asc("extra1")])
                .with_projection(["id"])
        };
        let only_ids = |c: &Connection<Record>| c.nodes().all(|record| record.columns.len() == 1);

        let first = paginator
            .paginate_connection(args().with_first(2))
            .await
            .unwrap();
        assert_eq!(edge_ids(&first), [2, 3]);
        assert!(only_ids(&first));

        let end = first.page_info.end_cursor.clone().unwrap();
        let second = paginator
            .paginate_connection(args().with_first(2).with_after(end))
            .await
            .unwrap();
        assert_eq!(edge_ids(&second), [1, 5]);
        assert!(only_ids(&second));

        let start = second.page_info.start_cursor.clone().unwrap();
        let back = paginator
            .paginate_connection(args().with_last(2).with_before(start))
            .await
            .unwrap();
        assert_eq!(edge_ids(&back), [2, 3]);
        assert!(only_ids(&back));
    }

    /// Pages forward until `hasNext` is false, then steps back from every page.
    async fn traverse(order: Vec<SortBy>, expected: &[i64]) {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);

        for limit in 1..=expected.len() as u64 + 1 {
            let args = || PageArgs::new().with_order(order.clone()).with_limit(limit);

            let mut pages = Vec::new();
            let mut cursor: Option<String> = None;
            loop {
                let request = match cursor.take() {
                    Some(cursor) => args().with_cursor(cursor),
                    None => args(),
                };
                let page = paginator.paginate(request).await.unwrap();
                let has_next = page.cursors.has_next;
                cursor = page.cursors.next_cursor.clone();
                pages.push(page);

                if !has_next {
                    break;
                }
                assert!(pages.len() <= expected.len(), "limit {limit} never ends");
            }

            let seen: Vec<i64> = pages.iter().flat_map(ids).collect();
            assert_eq!(seen, expected, "limit {limit}");

            for k in 1..pages.len() {
                let cursor = pages[k].cursors.prev_cursor.clone().unwrap();
                let back = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
                assert_eq!(ids(&back), ids(&pages[k - 1]), "limit {limit}, page {k}");
                assert_eq!(flags(&back), (k > 1, true), "limit {limit}, page {k}");
            }
        }
    }

    #[tokio::test]
    async fn every_limit_covers_all_rows_and_steps_back() {
        traverse(vec![], &[1, 2, 3, 4, 5]).await;
        traverse(vec![SortBy::asc("extra1")], &[2, 3, 1, 5, 4]).await;
        traverse(vec![SortBy::desc("id")], &[5, 4, 3, 2, 1]).await;
        traverse(vec![SortBy::desc("extra1")], &[4, 5, 1, 3, 2]).await;
        traverse(vec![SortBy::asc("extra2")], &[1, 5, 2, 3, 4]).await;
        traverse(vec![SortBy::desc("extra2")], &[2, 3, 4, 1, 5]).await;
        traverse(
            vec![SortBy::desc("extra2"), SortBy::asc("extra1")],
            &[2, 3, 4, 1, 5],
        )
        .await;
    }

    #[tokio::test]
    async fn filter_is_combined_with_range() {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);
        let args = || {
            PageArgs::new()
                .with_filter(Predicate::eq("extra2", 3))
                .with_limit(2)
        };

        let first = paginator.paginate(args()).await.unwrap();
        assert_eq!(ids(&first), [2, 3]);
        assert!(first.cursors.has_next);

        let cursor = first.cursors.next_cursor.clone().unwrap();
        let second = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&second), [4]);
        assert!(!second.cursors.has_next);
    }

    #[tokio::test]
    async fn exact_multiple_of_limit() {
        let table = MemoryTable::from_records((1..=4).map(|id| Record::new().set("id", id)));
        let paginator = Paginator::with_defaults(&table);

        let first = paginator
            .paginate(PageArgs::new().with_limit(2))
            .await
            .unwrap();
        let cursor = first.cursors.next_cursor.clone().unwrap();
        let second = paginator
            .paginate(PageArgs::new().with_limit(2).with_cursor(cursor))
            .await
            .unwrap();

        assert_eq!(ids(&second), [3, 4]);
        assert!(!second.cursors.has_next);
    }

    #[tokio::test]
    async fn zero_limit_returns_empty_page() {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);

        let page = paginator
            .paginate(PageArgs::new().with_limit(0))
            .await
            .unwrap();

        assert!(page.is_empty());
        assert!(page.cursors.has_next);
        assert!(page.cursors.prev_cursor.is_none());
        assert!(page.cursors.next_cursor.is_none());
    }

    #[tokio::test]
    async fn empty_table() {
        let table = MemoryTable::new();
        let paginator = Paginator::with_defaults(&table);

        let page = paginator
            .paginate(PageArgs::new().with_limit(2))
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(flags(&page), (false, false));

        let connection = paginator
            .paginate_connection(ConnectionArgs::new().with_first(2))
            .await
            .unwrap();
        assert!(connection.edges.is_empty());
        assert_eq!(connection.page_info.start_cursor, None);
    }

    #[tokio::test]
    async fn timestamps_round_trip_through_cursors() {
        let base: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
        let table = MemoryTable::from_records((1..=5).map(|id: i64| {
            let created_at = base
                .checked_add(jiff::SignedDuration::from_secs(id * 60))
                .unwrap();
            Record::new().set("id", id).set("created_at", created_at)
        }));
        let paginator = Paginator::with_defaults(&table);
        let args = || {
            PageArgs::new()
                .with_order([SortBy::desc("created_at")])
                .with_limit(2)
        };

        let first = paginator.paginate(args()).await.unwrap();
        assert_eq!(ids(&first), [5, 4]);

        let cursor = first.cursors.next_cursor.clone().unwrap();
        let second = paginator.paginate(args().with_cursor(cursor)).await.unwrap();
        assert_eq!(ids(&second), [3, 2]);
    }

    #[tokio::test]
    async fn uuid_tiebreaker() {
        let ids_sorted = {
            let mut ids: Vec<uuid::Uuid> = (0..4).map(|_| uuid::Uuid::new_v4()).collect();
            ids.sort();
            ids
        };
        let table = MemoryTable::from_records(
            ids_sorted.iter().rev().map(|uuid| Record::new().set("uuid", *uuid)),
        );
        let config = PaginationConfig::default().with_primary_key_field("uuid");
        let paginator = Paginator::new(&table, config).unwrap();

        let first = paginator
            .paginate(PageArgs::new().with_limit(3))
            .await
            .unwrap();
        let cursor = first.cursors.next_cursor.clone().unwrap();
        let second = paginator
            .paginate(PageArgs::new().with_limit(3).with_cursor(cursor))
            .await
            .unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(second.results[0].get("uuid"), Some(&Value::Uuid(ids_sorted[3])));
    }

    #[tokio::test]
    async fn cursor_from_another_ordering_is_rejected() {
        let table = fixture();
        let paginator = Paginator::with_defaults(&table);

        let first = paginator
            .paginate(PageArgs::new().with_limit(2))
            .await
            .unwrap();
        let cursor = first.cursors.next_cursor.unwrap();

        let error = paginator
            .paginate(
                PageArgs::new()
                    .with_order([SortBy::asc("extra1")])
                    .with_cursor(cursor),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            MemoryError::Pagination(PaginationError::IncompatibleCursor { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_paginations_are_independent() {
        let table = Arc::new(fixture());
        let paginator = Arc::new(Paginator::with_defaults(Arc::clone(&table)));

        let tasks = (0..8).map(|i| {
            let paginator = Arc::clone(&paginator);
            async move {
                let order = if i % 2 == 0 {
                    SortBy::asc("extra1")
                } else {
                    SortBy::desc("extra1")
                };
                let page = paginator
                    .paginate(PageArgs::new().with_order([order]).with_limit(2))
                    .await
                    .unwrap();
                (i, ids(&page))
            }
        });

        for (i, page_ids) in futures::future::join_all(tasks).await {
            let expected: &[i64] = if i % 2 == 0 { &[2, 3] } else { &[4, 5] };
            assert_eq!(page_ids, expected);
        }
    }

    #[tokio::test]
    async fn insert_and_len() {
        let table = MemoryTable::new();
        assert!(table.is_empty().await);
        table.insert(Record::new().set("id", 1)).await;
        table
            .extend([Record::new().set("id", 2), Record::new().set("id", 3)])
            .await;
        assert_eq!(table.len().await, 3);
    }

    #[tokio::test]
    async fn find_all_applies_limit_and_projection() {
        let table = fixture();
        let query = Query {
            order: keyset_pagination::OrderBy::new(vec![SortBy::desc("extra1")]),
            limit: Some(2),
            projection: Some(vec!["id".to_owned()]),
            ..Query::default()
        };

        let rows = table.find_all(query).await.unwrap();
        assert_eq!(rows, vec![Record::new().set("id", 4), Record::new().set("id", 5)]);
    }
}
