//! Error types for the Horizon Bind document model.

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Errors that can occur while manipulating a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The node ID is invalid or the node has been destroyed.
    #[error("Invalid or destroyed node ID")]
    InvalidNodeId,

    /// Attempted to insert a node into its own subtree.
    #[error("Cannot insert a node into itself or one of its descendants")]
    CircularParentage,

    /// The operation requires an element but the node is a text node.
    #[error("Node is not an element")]
    NotAnElement,

    /// The reference node passed to an insertion is not a child of the parent.
    #[error("Reference node is not a child of the target parent")]
    NotAChild,

    /// The root element cannot be destroyed.
    #[error("Cannot destroy the root element")]
    RootNode,

    /// Markup passed to an inner-markup setter could not be parsed.
    #[error("Malformed markup: {0}")]
    Markup(String),
}

/// Errors that can occur while loading a [`DocumentConfig`](crate::DocumentConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration text is not valid TOML or does not match the schema.
    #[error("Failed to parse document config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A namespace prefix was declared with an empty URI.
    #[error("Namespace prefix '{0}' has an empty URI")]
    EmptyNamespace(String),
}
