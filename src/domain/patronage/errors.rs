//! Error types for snapshot reconciliation.
//!
//! Callers (webhook handlers, the scheduled sync job) use
//! [`PatronageError::is_retryable`] to decide whether to retry the whole
//! operation later.

use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur while reconciling the patron snapshot.
#[derive(Debug, Error)]
pub enum PatronageError {
    /// A page fetch failed or returned an error marker; the pull was aborted
    /// before anything was written.
    #[error("Upstream fetch failed for {uri}: {reason}")]
    UpstreamFetch { uri: String, reason: String },

    /// A single-entry envelope did not identify a patron.
    #[error("Malformed entry: {0}")]
    MalformedEntry(String),

    /// Reading or writing a persisted blob failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A persisted blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The identity lookup collaborator failed.
    #[error("Identity lookup failed: {0}")]
    Identity(String),

    /// The access grant collaborator failed.
    #[error("Access grant failed: {0}")]
    Access(String),
}

impl PatronageError {
    pub fn upstream(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        PatronageError::UpstreamFetch {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if retrying the operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PatronageError::UpstreamFetch { .. }
                | PatronageError::Storage(_)
                | PatronageError::Identity(_)
                | PatronageError::Access(_)
        )
    }
}

impl From<serde_json::Error> for PatronageError {
    fn from(err: serde_json::Error) -> Self {
        PatronageError::Serialization(err.to_string())
    }
}

/// Identity and access ports report `DomainError`; this maps the lookup side.
pub(crate) fn identity_error(err: DomainError) -> PatronageError {
    PatronageError::Identity(err.to_string())
}

pub(crate) fn access_error(err: DomainError) -> PatronageError {
    PatronageError::Access(err.to_string())
}
