//! Predicate evaluation and row ordering with SQL semantics.

use std::cmp::Ordering;

use keyset_pagination::{CompareOp, OrderBy, Predicate, Row, SortOrder, Value};

/// Returns whether `row` satisfies `predicate`.
///
/// Missing fields read as `NULL`. A comparison involving `NULL`, or between
/// values of unrelated types, is never satisfied.
pub(crate) fn matches<R: Row>(predicate: &Predicate, row: &R) -> bool {
    match predicate {
        Predicate::And(parts) => parts.iter().all(|part| matches(part, row)),
        Predicate::Or(parts) => parts.iter().any(|part| matches(part, row)),
        Predicate::Compare { field, op, value } => {
            let actual = row.field(field).unwrap_or(Value::Null);
            compare(&actual, *op, value)
        }
        Predicate::IsNull(field) => row.field(field).is_none_or(|value| value.is_null()),
        Predicate::IsNotNull(field) => row.field(field).is_some_and(|value| !value.is_null()),
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    let Some(ordering) = left.sql_cmp(right) else {
        return false;
    };

    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
    }
}

/// Total order over rows under `order`.
///
/// `NULL` sorts before every other value, so it comes first under `ASC`
/// and last under `DESC`.
pub(crate) fn cmp_rows<R: Row>(order: &OrderBy, left: &R, right: &R) -> Ordering {
    for sort in order.iter() {
        let a = left.field(&sort.field).unwrap_or(Value::Null);
        let b = right.field(&sort.field).unwrap_or(Value::Null);
        let ordering = match sort.order {
            SortOrder::Asc => cmp_values(&a, &b),
            SortOrder::Desc => cmp_values(&b, &a),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn cmp_values(a: &Value, b: &Value) -> Ordering {
    a.sql_cmp(b)
        .unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::Text(_) => 3,
        Value::Timestamp(_) => 4,
        Value::Uuid(_) => 5,
    }
}
