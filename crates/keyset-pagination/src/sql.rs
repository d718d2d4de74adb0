//! Rendering of [`Query`] values as parameterized SQL.
//!
//! The output uses `$n` placeholders and double-quoted identifiers, which is
//! what PostgreSQL and SQLite both accept. Values are never interpolated into
//! the statement text: they are collected into [`SqlStatement::binds`] in
//! placeholder order.

use crate::error::{PaginationError, Result};
use crate::query::Query;
use crate::types::{OrderBy, Predicate, SortOrder, Value};

/// A rendered statement and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    /// Statement text with `$1`, `$2`, ... placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub binds: Vec<Value>,
}

/// Renders `SELECT ... FROM table WHERE ... ORDER BY ... LIMIT ...`.
///
/// ```rust
/// use keyset_pagination::sql::render_select;
/// use keyset_pagination::{OrderBy, Predicate, Query, SortBy};
///
/// let query = Query {
///     filter: Some(Predicate::gt("id", 10)),
///     order: OrderBy::new(vec![SortBy::asc("id")]),
///     limit: Some(3),
///     ..Query::default()
/// };
/// let statement = render_select("users", &query).unwrap();
/// assert_eq!(
///     statement.sql,
///     r#"SELECT * FROM "users" WHERE "id" > $1 ORDER BY "id" ASC LIMIT 3"#
/// );
/// ```
pub fn render_select(table: &str, query: &Query) -> Result<SqlStatement> {
    let mut binds = Vec::new();

    let columns = match &query.projection {
        Some(fields) if !fields.is_empty() => fields
            .iter()
            .map(|field| quote_identifier(field))
            .collect::<Result<Vec<_>>>()?
            .join(", "),
        _ => "*".to_owned(),
    };

    let mut clauses = vec![format!("SELECT {columns} FROM {}", quote_identifier(table)?)];

    if let Some(filter) = &query.filter {
        clauses.push(format!("WHERE {}", render_predicate(filter, &mut binds)?));
    }

    if !query.order.is_empty() {
        clauses.push(format!("ORDER BY {}", render_order_by(&query.order)?));
    }

    if let Some(limit) = query.limit {
        clauses.push(format!("LIMIT {limit}"));
    }

    let sql = clauses.join(" ");
    Ok(SqlStatement { sql, binds })
}

/// Renders a predicate, appending its values to `binds`.
///
/// Placeholders are numbered after the values already in `binds`, so one
/// vector can be shared across several fragments of the same statement.
pub fn render_predicate(predicate: &Predicate, binds: &mut Vec<Value>) -> Result<String> {
    match predicate {
        Predicate::And(parts) if parts.is_empty() => Ok("TRUE".to_owned()),
        Predicate::Or(parts) if parts.is_empty() => Ok("FALSE".to_owned()),
        Predicate::And(parts) => render_group(parts, " AND ", binds),
        Predicate::Or(parts) => render_group(parts, " OR ", binds),
        Predicate::Compare { field, op, value } => {
            let field = quote_identifier(field)?;
            binds.push(value.clone());
            Ok(format!("{field} {} ${}", op.as_sql(), binds.len()))
        }
        Predicate::IsNull(field) => Ok(format!("{} IS NULL", quote_identifier(field)?)),
        Predicate::IsNotNull(field) => Ok(format!("{} IS NOT NULL", quote_identifier(field)?)),
    }
}

fn render_group(parts: &[Predicate], separator: &str, binds: &mut Vec<Value>) -> Result<String> {
    if let [single] = parts {
        return render_predicate(single, binds);
    }

    let rendered = parts
        .iter()
        .map(|part| render_predicate(part, binds).map(|sql| format!("({sql})")))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(separator))
}

/// Renders an ordering as the body of an `ORDER BY` clause.
pub fn render_order_by(order: &OrderBy) -> Result<String> {
    let rendered = order
        .iter()
        .map(|sort| {
            let direction = match sort.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            Ok(format!("{} {direction}", quote_identifier(&sort.field)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

/// Validates and double-quotes an identifier.
///
/// Accepts `[a-zA-Z_][a-zA-Z0-9_]*` segments joined by `.`; each segment is
/// quoted separately so `users.id` becomes `"users"."id"`.
pub fn quote_identifier(name: &str) -> Result<String> {
    let segments = name
        .split('.')
        .map(|segment| {
            if !is_valid_segment(segment) {
                return Err(PaginationError::InvalidIdentifier(name.to_owned()));
            }
            Ok(format!("\"{segment}\""))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("."))
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
