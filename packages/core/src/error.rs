//! Error types for identifier validation and stored-document handling.

/// A string that cannot be used as a local identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("local id must not be empty")]
    Empty,

    #[error("local id {0:?} is a dot segment")]
    DotSegment(String),

    #[error("local id {id:?} contains forbidden character {found:?}")]
    InvalidChar { id: String, found: char },
}

/// A stored container document that cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An item's stored `id` has no path segment to re-mint from.
    #[error("annotation at index {index} has no usable id: {id:?}")]
    MissingLocalId { index: usize, id: String },
}
