//! Tuple-comparison range predicates.
//!
//! For an ordering `(f0 d0, f1 d1, ..., fn dn)` and a boundary tuple
//! `(v0, v1, ..., vn)`, the rows strictly after the boundary are
//!
//! ```text
//! f0 ≻ v0  OR  (f0 = v0 AND (f1 ≻ v1 OR (f1 = v1 AND ( ... fn ≻ vn))))
//! ```
//!
//! where `≻` is `>` for ascending fields and `<` for descending ones. The
//! predicate is built as data and evaluated by the query engine, so its
//! meaning depends on the engine comparing values the same way it orders
//! them.

use crate::error::{PaginationError, Result};
use crate::types::{CompareOp, OrderBy, Predicate, SortBy, SortOrder, Value};

/// Returns the predicate selecting rows strictly after `values` under `order`.
///
/// `values` must carry exactly one entry per ordering field.
pub fn after(order: &OrderBy, values: &[Value]) -> Result<Predicate> {
    if values.len() != order.len() {
        return Err(PaginationError::IncompatibleCursor {
            expected: order.len(),
            found: values.len(),
        });
    }

    let mut pairs = order.iter().zip(values).rev();
    let Some((sort, value)) = pairs.next() else {
        // No fields: nothing sorts strictly after an empty tuple.
        return Ok(Predicate::Or(Vec::new()));
    };

    let predicate = pairs.fold(strictly_past(sort, value), |rest, (sort, value)| {
        Predicate::Or(vec![
            strictly_past(sort, value),
            Predicate::And(vec![Predicate::eq(sort.field.as_str(), value.clone()), rest]),
        ])
    });

    Ok(predicate)
}

/// Returns the predicate selecting rows strictly before `values` under `order`.
#[inline]
pub fn before(order: &OrderBy, values: &[Value]) -> Result<Predicate> {
    after(&order.reversed(), values)
}

fn strictly_past(sort: &SortBy, value: &Value) -> Predicate {
    let op = match sort.order {
        SortOrder::Asc => CompareOp::Gt,
        SortOrder::Desc => CompareOp::Lt,
    };
    Predicate::compare(sort.field.as_str(), op, value.clone())
}
