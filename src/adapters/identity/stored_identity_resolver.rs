//! Blob-backed identity resolver.
//!
//! Account links live in one JSON object blob, `patron-accounts`, mapping
//! patron ID to local user ID. The table is written by the account-linking
//! flow and read here.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, PatronId, UserId};
use crate::ports::{BlobStore, IdentityResolver};

/// Blob holding the patron → local user table.
pub const PATRON_ACCOUNTS_BLOB: &str = "patron-accounts";

type AccountLinks = BTreeMap<PatronId, UserId>;

/// `IdentityResolver` reading account links from a `BlobStore`.
pub struct StoredIdentityResolver {
    store: Arc<dyn BlobStore>,
}

impl StoredIdentityResolver {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Link a patron to a local account, replacing any earlier link.
    pub async fn link(&self, patron_id: PatronId, user_id: UserId) -> Result<(), DomainError> {
        let mut links = self.load().await?;
        links.insert(patron_id, user_id);

        let json = serde_json::to_string(&links).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Serialize error: {}", e))
        })?;
        self.store
            .set(PATRON_ACCOUNTS_BLOB, &json)
            .await
            .map_err(|e| DomainError::new(ErrorCode::StorageError, e.to_string()))
    }

    async fn load(&self) -> Result<AccountLinks, DomainError> {
        let raw = self
            .store
            .get(PATRON_ACCOUNTS_BLOB)
            .await
            .map_err(|e| DomainError::new(ErrorCode::StorageError, e.to_string()))?;

        match raw {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map_err(|e| {
                DomainError::new(
                    ErrorCode::IdentityLookupFailed,
                    format!("Unreadable account links: {}", e),
                )
            }),
            _ => Ok(AccountLinks::new()),
        }
    }
}

#[async_trait]
impl IdentityResolver for StoredIdentityResolver {
    async fn resolve_local_user(
        &self,
        patron_id: &PatronId,
    ) -> Result<Option<UserId>, DomainError> {
        let mut links = self
            .load()
            .await
            .map_err(|e| e.with_detail("patron_id", patron_id.as_str()))?;
        Ok(links.remove(patron_id))
    }

    async fn resolve_local_users(
        &self,
        patron_ids: &[PatronId],
    ) -> Result<BTreeMap<PatronId, UserId>, DomainError> {
        let mut links = self.load().await?;
        Ok(patron_ids
            .iter()
            .filter_map(|patron_id| {
                links
                    .remove(patron_id)
                    .map(|user_id| (patron_id.clone(), user_id))
            })
            .collect())
    }
}
