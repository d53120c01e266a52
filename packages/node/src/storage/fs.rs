//! Filesystem storage implementation.
//!
//! Each container is one pretty-printed JSON file, `{local_id}.json`, directly
//! inside the root directory. Writes go to a uniquely named temporary file in
//! the same directory and are then renamed over the target, so a reader never
//! sees a half-written document.
//!
//! The root directory is created lazily on first use. Concurrent first
//! callers share a single `create_dir_all`; later calls return immediately.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use elucidate::{generate_local_id, Container};
use tokio::sync::OnceCell;

use super::{Storage, StorageError};

/// File-per-container implementation of [`Storage`].
pub struct FsStorage {
    root: PathBuf,
    ready: OnceCell<()>,
}

impl FsStorage {
    /// Store documents under `root`. Nothing touches the disk until the first
    /// operation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ready: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `local_id`.
    pub fn document_path(&self, local_id: &str) -> PathBuf {
        self.root.join(format!("{local_id}.json"))
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        self.ready
            .get_or_try_init(|| async {
                tokio::fs::create_dir_all(&self.root).await?;
                tracing::debug!("storage: directory ready at {}", self.root.display());
                Ok::<(), StorageError>(())
            })
            .await?;
        Ok(())
    }

    async fn exists(&self, local_id: &str) -> Result<bool, StorageError> {
        self.ensure_ready().await?;
        Ok(tokio::fs::try_exists(self.document_path(local_id)).await?)
    }

    async fn load(&self, local_id: &str) -> Result<Option<Container>, StorageError> {
        self.ensure_ready().await?;
        let path = self.document_path(local_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<Container>(&bytes) {
            Ok(mut container) => {
                container.recount();
                Ok(Some(container))
            }
            Err(e) => {
                tracing::warn!("storage: unreadable document {}: {e}", path.display());
                Ok(None)
            }
        }
    }

    async fn save(&self, local_id: &str, container: Container) -> Result<Container, StorageError> {
        self.ensure_ready().await?;
        let mut bytes = serde_json::to_vec_pretty(&container)?;
        bytes.push(b'\n');

        let path = self.document_path(local_id);
        let tmp = self
            .root
            .join(format!(".{local_id}.{}.tmp", generate_local_id()));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!("saved container {}", path.display());
        Ok(container)
    }
}
