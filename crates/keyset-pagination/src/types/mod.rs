//! Value, ordering and predicate types shared by the engine and its collaborators.

mod predicate;
mod sorting;
mod value;

pub use predicate::{CompareOp, Predicate};
pub use sorting::{OrderBy, SortBy, SortOrder};
pub use value::Value;
