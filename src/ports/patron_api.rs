//! Patron API Port - Interface for fetching pages from the billing API.
//!
//! Retry, backoff and timeouts belong to the implementation; callers treat
//! any error as fatal for the operation in progress.

use async_trait::async_trait;
use serde_json::Value;

/// Errors that can occur while fetching a page
#[derive(Debug, thiserror::Error)]
pub enum PatronApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// Port for the subscription-billing API
#[async_trait]
pub trait PatronApi: Send + Sync {
    /// Fetch one page by URI
    ///
    /// # Arguments
    /// * `uri` - Absolute URL, or a path relative to the API base
    ///
    /// # Returns
    /// The decoded JSON body, or `None` if the response had no body
    async fn fetch_page(&self, uri: &str) -> Result<Option<Value>, PatronApiError>;
}
