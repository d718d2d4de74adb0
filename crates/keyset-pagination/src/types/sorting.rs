//! Sorting specifications for paginated queries.

use derive_more::{Deref, From, IntoIterator};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sort order direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending order (A-Z, oldest first, smallest first).
    #[default]
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    Desc,
}

impl SortOrder {
    /// Returns the opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A single ordering entry: a field name and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SortBy {
    /// The field to sort by.
    pub field: String,
    /// The sort order direction.
    #[serde(default)]
    pub order: SortOrder,
}

impl SortBy {
    /// Creates a new sort specification with the given field and order.
    #[inline]
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Creates a new sort specification with ascending order.
    #[inline]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Creates a new sort specification with descending order.
    #[inline]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    /// Returns whether the sort order is ascending.
    #[inline]
    pub fn is_asc(&self) -> bool {
        matches!(self.order, SortOrder::Asc)
    }

    /// Returns the same field sorted the other way.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self::new(self.field.clone(), self.order.reversed())
    }
}

/// An ordered sequence of sort entries, most significant first.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Deref, From, IntoIterator,
)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct OrderBy(#[into_iterator(owned, ref)] Vec<SortBy>);

impl OrderBy {
    /// Creates an ordering from the given entries.
    #[inline]
    pub fn new(entries: Vec<SortBy>) -> Self {
        Self(entries)
    }

    /// Returns whether any entry sorts by `field`, in either direction.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|sort| sort.field == field)
    }

    /// Returns the ordering with `tiebreaker ASC` appended when no entry
    /// already sorts by it.
    ///
    /// A normalized ordering is never empty and, given a unique tiebreaker,
    /// defines a total order over rows.
    pub fn normalized(&self, tiebreaker: &str) -> Self {
        let mut entries = self.0.clone();
        if !self.contains_field(tiebreaker) {
            entries.push(SortBy::asc(tiebreaker));
        }
        Self(entries)
    }

    /// Returns the ordering with every direction inverted.
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().map(SortBy::reversed).collect())
    }

    /// Returns the field names, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|sort| sort.field.as_str())
    }
}

impl FromIterator<SortBy> for OrderBy {
    fn from_iter<I: IntoIterator<Item = SortBy>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
