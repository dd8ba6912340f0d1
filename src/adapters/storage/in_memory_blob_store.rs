//! In-Memory Blob Store Adapter
//!
//! Stores blobs in a map behind one lock.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{BlobStore, BlobStoreError};

/// In-memory storage for named blobs
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryBlobStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored blobs (useful for tests)
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }

    /// Get the number of stored blobs
    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Copy of every stored blob, for comparing states in tests
    pub async fn dump(&self) -> HashMap<String, String> {
        self.blobs.read().await.clone()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, name: &str) -> Result<Option<String>, BlobStoreError> {
        Ok(self.blobs.read().await.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), BlobStoreError> {
        self.blobs
            .write()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, blobs: &[(String, String)]) -> Result<(), BlobStoreError> {
        // One write guard: readers see all blobs replaced or none.
        let mut stored = self.blobs.write().await;
        for (name, value) in blobs {
            stored.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}
