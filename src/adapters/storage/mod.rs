//! Storage Adapters
//!
//! Implementations of the BlobStore port.
//!
//! ## Available Adapters
//!
//! - **InMemoryBlobStore** - Stores blobs in memory (testing/development)
//! - **FileBlobStore** - Stores each blob as a JSON file on disk
//! - **RedisBlobStore** - Stores blobs as Redis string keys (production)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileBlobStore, InMemoryBlobStore};
//!
//! // Local runs: file-based storage
//! let store = FileBlobStore::new("./data/patron-sync");
//!
//! // Testing: in-memory storage
//! let store = InMemoryBlobStore::new();
//! ```

mod file_blob_store;
mod in_memory_blob_store;
mod redis_blob_store;

pub use file_blob_store::FileBlobStore;
pub use in_memory_blob_store::InMemoryBlobStore;
pub use redis_blob_store::RedisBlobStore;
