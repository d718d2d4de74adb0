//! Query shape arguments shared by both subcommands.

use std::path::PathBuf;

use clap::Args;
use keyset_pagination::{CompareOp, Predicate, SortBy, SortOrder, Value};

/// Source rows and the query paginated over them.
#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    /// JSON file holding an array of objects
    #[arg(long = "rows", value_name = "FILE")]
    pub rows: PathBuf,

    /// Ordering entry as `field` or `field:asc|desc`, repeatable
    #[arg(long = "order", value_name = "FIELD[:DIR]", value_parser = parse_sort_by)]
    pub order: Vec<SortBy>,

    /// Unique tiebreaker for this query, overriding the primary key
    #[arg(long = "pagination-field", value_name = "FIELD")]
    pub pagination_field: Option<String>,

    /// Comma-separated fields to return on each row
    #[arg(long = "attributes", value_name = "FIELDS", value_delimiter = ',')]
    pub attributes: Option<Vec<String>>,

    /// Filter such as `status=active` or `score>=10`, repeatable
    #[arg(long = "where", value_name = "FILTER", value_parser = parse_filter)]
    pub filters: Vec<Predicate>,
}

impl QueryArgs {
    /// Returns all filters combined with `AND`, or `None` without filters.
    pub fn filter(&self) -> Option<Predicate> {
        self.filters
            .iter()
            .cloned()
            .reduce(Predicate::and)
    }
}

/// Parses `field` or `field:asc|desc`.
fn parse_sort_by(input: &str) -> Result<SortBy, String> {
    let (field, order) = match input.rsplit_once(':') {
        Some((field, direction)) => {
            let order = match direction.to_ascii_lowercase().as_str() {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                other => return Err(format!("unknown sort direction `{other}`")),
            };
            (field, order)
        }
        None => (input, SortOrder::Asc),
    };

    if field.is_empty() {
        return Err("field name cannot be empty".to_owned());
    }
    Ok(SortBy::new(field, order))
}

/// Parses `field<op>value`.
fn parse_filter(input: &str) -> Result<Predicate, String> {
    // Two-character operators first so `>=` is not read as `>`.
    const OPERATORS: [(&str, CompareOp); 6] = [
        ("!=", CompareOp::Ne),
        (">=", CompareOp::Gte),
        ("<=", CompareOp::Lte),
        ("=", CompareOp::Eq),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ];

    let (index, symbol, op) = OPERATORS
        .iter()
        .filter_map(|&(symbol, op)| input.find(symbol).map(|index| (index, symbol, op)))
        .min_by_key(|&(index, symbol, _)| (index, std::cmp::Reverse(symbol.len())))
        .ok_or_else(|| format!("expected `field<op>value` in `{input}`"))?;

    let field = input[..index].trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{input}`"));
    }

    let value = parse_literal(input[index + symbol.len()..].trim());
    Ok(match (op, value) {
        (CompareOp::Eq, Value::Null) => Predicate::is_null(field),
        (CompareOp::Ne, Value::Null) => Predicate::is_not_null(field),
        (op, value) => Predicate::compare(field, op, value),
    })
}

/// Reads a literal as the narrowest matching scalar.
fn parse_literal(input: &str) -> Value {
    if let Some(text) = input
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::from(text);
    }

    match input {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => input
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| input.parse::<f64>().map(Value::Float))
            .unwrap_or_else(|_| Value::from(input)),
    }
}
