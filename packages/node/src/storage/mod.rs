//! Storage abstraction for container documents.
//!
//! A container and all of its annotations live in one document keyed by the
//! container's local id. There is no index and no cache: every protocol
//! operation goes back to the store, which is the only source of truth.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`FsStorage`] | Production; one `{local_id}.json` file per container |
//! | [`MemoryStorage`] | Tests and ephemeral nodes |
//!
//! [`FsStorage`]: fs::FsStorage
//! [`MemoryStorage`]: memory::MemoryStorage

pub mod fs;
pub mod memory;

use async_trait::async_trait;
use elucidate::Container;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors that storage operations can return.
///
/// A missing or unreadable document is not an error: [`Storage::load`]
/// reports it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O failure in the backing directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A container could not be serialised for writing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure.
    #[error("internal storage error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// The persistence contract for container documents.
///
/// Implementations must be `Send + Sync + 'static` so they can be held in an
/// `Arc<dyn Storage>`. None of the methods lock across calls: a check
/// followed by a write, or a load followed by a save, may interleave with
/// another request doing the same.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Prepare the backend (e.g. create the directory). Idempotent; every
    /// other method calls it first.
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    /// Return `true` if a document for `local_id` is present.
    async fn exists(&self, local_id: &str) -> Result<bool, StorageError>;

    /// Load the document for `local_id`.
    ///
    /// Returns `None` both when the document is absent and when it cannot be
    /// parsed, so callers treat missing and corrupt alike.
    async fn load(&self, local_id: &str) -> Result<Option<Container>, StorageError>;

    /// Replace the document for `local_id` with `container` and hand it back.
    async fn save(&self, local_id: &str, container: Container) -> Result<Container, StorageError>;
}
