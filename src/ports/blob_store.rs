//! Blob Store Port - Interface for persisting named text blobs.
//!
//! Every derived table (pledges, declines, reward index, emails, expirations)
//! is stored as one whole blob and replaced wholesale on write. There is no
//! row-level persistence.

use async_trait::async_trait;

/// Errors that can occur during blob store operations
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Port for reading and writing named blobs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob
    ///
    /// # Returns
    /// `None` if no blob has been written under `name`
    async fn get(&self, name: &str) -> Result<Option<String>, BlobStoreError>;

    /// Replace a blob
    async fn set(&self, name: &str, value: &str) -> Result<(), BlobStoreError>;

    /// Replace several blobs as one write
    ///
    /// The default writes one blob at a time, so a failure part-way through
    /// leaves earlier blobs replaced. Adapters that can do better override it.
    async fn set_many(&self, blobs: &[(String, String)]) -> Result<(), BlobStoreError> {
        for (name, value) in blobs {
            self.set(name, value).await?;
        }
        Ok(())
    }
}
