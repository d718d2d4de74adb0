//! Filter predicates understood by query engines.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Value;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl CompareOp {
    /// Returns the SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A boolean filter expression over named fields.
///
/// Predicates are plain data: query engines translate them into their own
/// filter language. An empty `And` is always true and an empty `Or` is
/// always false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// All inner predicates hold.
    And(Vec<Predicate>),
    /// At least one inner predicate holds.
    Or(Vec<Predicate>),
    /// `field <op> value`.
    Compare {
        /// Field name.
        field: String,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        value: Value,
    },
    /// `field IS NULL`.
    IsNull(String),
    /// `field IS NOT NULL`.
    IsNotNull(String),
}

impl Predicate {
    /// The predicate that matches every row.
    #[inline]
    pub fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Creates `field <op> value`.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Creates `field = value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Creates `field <> value`.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// Creates `field > value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// Creates `field >= value`.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Creates `field < value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// Creates `field <= value`.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// Creates `field IS NULL`.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull(field.into())
    }

    /// Creates `field IS NOT NULL`.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::IsNotNull(field.into())
    }

    /// Combines two predicates with `AND`, flattening nested conjunctions.
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (this, Self::And(mut right)) => {
                right.insert(0, this);
                Self::And(right)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    /// Combines two predicates with `OR`.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Or(mut left) => {
                left.push(other);
                Self::Or(left)
            }
            this => Self::Or(vec![this, other]),
        }
    }

    /// Returns whether this predicate is the trivially true empty conjunction.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        matches!(self, Self::And(inner) if inner.is_empty())
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::all()
    }
}
