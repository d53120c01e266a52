//! In-memory storage implementation.
//!
//! Documents are held in RAM behind a [`RwLock`] and are lost when the process
//! exits. Use this for tests and ephemeral nodes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use elucidate::Container;

use super::{Storage, StorageError};

/// Thread-safe, in-memory implementation of [`Storage`].
pub struct MemoryStorage {
    containers: RwLock<HashMap<String, Container>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored containers.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.containers.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Internal("memory store lock poisoned".into())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn exists(&self, local_id: &str) -> Result<bool, StorageError> {
        let containers = self.containers.read().map_err(poisoned)?;
        Ok(containers.contains_key(local_id))
    }

    async fn load(&self, local_id: &str) -> Result<Option<Container>, StorageError> {
        let containers = self.containers.read().map_err(poisoned)?;
        Ok(containers.get(local_id).cloned())
    }

    async fn save(&self, local_id: &str, container: Container) -> Result<Container, StorageError> {
        let mut containers = self.containers.write().map_err(poisoned)?;
        containers.insert(local_id.to_string(), container.clone());
        Ok(container)
    }
}
