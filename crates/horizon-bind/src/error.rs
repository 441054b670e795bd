//! Error types for selections and data joins.

use horizon_bind_core::DocumentError;

/// Result type alias for selection operations.
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Errors that can occur while joining data or mutating a selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Two new data values in one group produced the same key.
    #[error("Duplicate key {key} at index {index} of group {group}")]
    DuplicateKey {
        group: usize,
        index: usize,
        key: String,
    },

    /// An enter slot has no parent to insert the new node into.
    #[error("Enter group {group} has no parent node")]
    NoParent { group: usize },

    /// Markup passed to `html` could not be parsed.
    #[error("Malformed markup: {0}")]
    Markup(String),

    /// The underlying document rejected an operation.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl SelectionError {
    /// Create a duplicate key error.
    pub fn duplicate_key(group: usize, index: usize, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            group,
            index,
            key: key.into(),
        }
    }

    /// Lift a document error, keeping markup failures distinct.
    pub(crate) fn from_document(error: DocumentError) -> Self {
        match error {
            DocumentError::Markup(message) => Self::Markup(message),
            other => Self::Document(other),
        }
    }
}
