//! Persistence of the four snapshot tables.
//!
//! Each table is one JSON object blob. Tables are loaded whole, mutated in
//! memory, and written back together with a single `set_many`.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::patronage::{PatronSnapshot, PatronageError};
use crate::ports::{BlobStore, BlobStoreError};

pub const PLEDGES_BLOB: &str = "pledges";
pub const DECLINES_BLOB: &str = "pledge-declines";
pub const REWARD_USERS_BLOB: &str = "reward-users";
pub const USERS_BLOB: &str = "users";
pub const EXPIRATIONS_BLOB: &str = "expirations";

impl From<BlobStoreError> for PatronageError {
    fn from(err: BlobStoreError) -> Self {
        PatronageError::Storage(err.to_string())
    }
}

/// Reads and writes the snapshot tables through a [`BlobStore`].
#[derive(Clone)]
pub struct SnapshotTables {
    store: Arc<dyn BlobStore>,
}

impl SnapshotTables {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Loads every table. Missing or blank blobs load as empty tables.
    pub async fn load(&self) -> Result<PatronSnapshot, PatronageError> {
        Ok(PatronSnapshot {
            pledges: load_blob(self.store.as_ref(), PLEDGES_BLOB).await?,
            declines: load_blob(self.store.as_ref(), DECLINES_BLOB).await?,
            reward_users: load_blob(self.store.as_ref(), REWARD_USERS_BLOB).await?,
            users: load_blob(self.store.as_ref(), USERS_BLOB).await?,
        })
    }

    /// Replaces every table in one composite write.
    pub async fn save(&self, snapshot: &PatronSnapshot) -> Result<(), PatronageError> {
        let blobs = vec![
            (
                PLEDGES_BLOB.to_string(),
                serde_json::to_string(&snapshot.pledges)?,
            ),
            (
                DECLINES_BLOB.to_string(),
                serde_json::to_string(&snapshot.declines)?,
            ),
            (
                REWARD_USERS_BLOB.to_string(),
                serde_json::to_string(&snapshot.reward_users)?,
            ),
            (USERS_BLOB.to_string(), serde_json::to_string(&snapshot.users)?),
        ];

        self.store.set_many(&blobs).await?;
        Ok(())
    }
}

/// Loads one JSON blob, defaulting when it has never been written.
pub(crate) async fn load_blob<T>(store: &dyn BlobStore, name: &str) -> Result<T, PatronageError>
where
    T: DeserializeOwned + Default,
{
    match store.get(name).await? {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map_err(|e| {
            PatronageError::Serialization(format!("blob '{}': {}", name, e))
        }),
        _ => Ok(T::default()),
    }
}
