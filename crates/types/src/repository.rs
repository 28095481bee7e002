//! The storage capability consumed by the palette.

use thiserror::Error;

use crate::Item;

/// Errors surfaced while evaluating a filter expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The expression could not be parsed.
    #[error("malformed filter expression: {0}")]
    Parse(String),
    /// The expression uses an operator the repository does not understand.
    #[error("unknown filter operator: {0}")]
    UnknownOperator(String),
}

/// Backing store of searchable, taggable items.
///
/// Implementations own their synchronization; the palette only ever calls these
/// from a single thread but hosts may share the repository with other tasks.
pub trait Repository: Send + Sync {
    /// Evaluate a filter expression and return matching titles in order.
    fn filter_query(&self, expression: &str) -> Result<Vec<String>, QueryError>;

    /// Titles of all items (stored or shadow) tagged with `tag`.
    fn items_by_tag(&self, tag: &str) -> Vec<String>;

    /// Fetch a stored or shadow item by title.
    fn get_item(&self, title: &str) -> Option<Item>;

    /// Whether a stored or shadow item with this title exists.
    fn item_or_shadow_exists(&self, title: &str) -> bool;

    /// Every field name used by any item.
    fn list_fields(&self) -> Vec<String>;
}
