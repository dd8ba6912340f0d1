//! File-based Blob Store Adapter
//!
//! Stores each blob as `<name>.json` under a base directory.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never sees a half-written blob.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{BlobStore, BlobStoreError};

/// File-based storage for named blobs
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    base_path: PathBuf,
}

impl FileBlobStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileBlobStore::new("./data/patron-sync");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path for a blob
    fn blob_path(&self, name: &str) -> Result<PathBuf, BlobStoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(BlobStoreError::IoError(format!("invalid blob name: {:?}", name)));
        }
        Ok(self.base_path.join(format!("{}.json", name)))
    }

    fn staging_path(path: &Path) -> PathBuf {
        path.with_extension("json.tmp")
    }

    async fn ensure_dir(&self) -> Result<(), BlobStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| BlobStoreError::IoError(e.to_string()))
    }

    async fn stage(&self, name: &str, value: &str) -> Result<(PathBuf, PathBuf), BlobStoreError> {
        let path = self.blob_path(name)?;
        let staging = Self::staging_path(&path);
        fs::write(&staging, value)
            .await
            .map_err(|e| BlobStoreError::IoError(e.to_string()))?;
        Ok((staging, path))
    }

    async fn commit(staging: &Path, path: &Path) -> Result<(), BlobStoreError> {
        fs::rename(staging, path)
            .await
            .map_err(|e| BlobStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, name: &str) -> Result<Option<String>, BlobStoreError> {
        let path = self.blob_path(name)?;

        if !path.exists() {
            return Ok(None);
        }

        let value = fs::read_to_string(&path)
            .await
            .map_err(|e| BlobStoreError::IoError(e.to_string()))?;
        Ok(Some(value))
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), BlobStoreError> {
        self.ensure_dir().await?;
        let (staging, path) = self.stage(name, value).await?;
        Self::commit(&staging, &path).await
    }

    async fn set_many(&self, blobs: &[(String, String)]) -> Result<(), BlobStoreError> {
        self.ensure_dir().await?;

        // Stage everything before renaming anything, so a failed write
        // leaves every live blob untouched.
        let mut staged = Vec::with_capacity(blobs.len());
        for (name, value) in blobs {
            match self.stage(name, value).await {
                Ok(paths) => staged.push(paths),
                Err(e) => {
                    for (staging, _) in &staged {
                        let _ = fs::remove_file(staging).await;
                    }
                    return Err(e);
                }
            }
        }

        // Renames are not atomic as a group; a crash here can still leave
        // a mix of old and new blobs.
        for (staging, path) in &staged {
            Self::commit(staging, path).await?;
        }
        Ok(())
    }
}
