//! ExpirationLedger - Per-user timed access expirations.
//!
//! Stored as the `expirations` blob, `UserId → YYYY-MM-DDTHH:MM:SSZ`. Every
//! change is mirrored to the [`AccessGrant`] port after it is persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::patronage::{access_error, PatronageError};
use crate::ports::{AccessGrant, BlobStore, Clock};

use super::tables::{load_blob, EXPIRATIONS_BLOB};

type ExpirationTable = BTreeMap<UserId, String>;

/// Tracks when each user's timed access lapses.
pub struct ExpirationLedger {
    store: Arc<dyn BlobStore>,
    access: Arc<dyn AccessGrant>,
    clock: Arc<dyn Clock>,
}

impl ExpirationLedger {
    pub fn new(
        store: Arc<dyn BlobStore>,
        access: Arc<dyn AccessGrant>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            access,
            clock,
        }
    }

    /// Records that `user_id`'s access lapses at `until`, then grants access
    /// up to that instant. Stored at whole-second precision; the grant gets
    /// the same value.
    pub async fn set(&self, user_id: &UserId, until: Timestamp) -> Result<(), PatronageError> {
        let until = until.trunc_subsecs();
        let mut table = self.load().await?;
        table.insert(user_id.clone(), until.to_iso8601());
        self.save(&table).await?;

        self.access
            .grant_access_until(user_id, until)
            .await
            .map_err(access_error)?;

        tracing::debug!(user_id = %user_id, until = %until, "Expiration recorded");
        Ok(())
    }

    /// Drops the user's expiration. No write and no revoke when none is stored.
    pub async fn clear(&self, user_id: &UserId) -> Result<bool, PatronageError> {
        Ok(self.clear_all(std::slice::from_ref(user_id)).await? == 1)
    }

    /// Drops the expirations of every listed user with one load and at most
    /// one save. Returns how many entries were removed.
    pub async fn clear_all(&self, user_ids: &[UserId]) -> Result<usize, PatronageError> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut table = self.load().await?;
        let removed: Vec<&UserId> = user_ids
            .iter()
            .filter(|user_id| table.remove(*user_id).is_some())
            .collect();

        if removed.is_empty() {
            return Ok(0);
        }
        self.save(&table).await?;

        for user_id in &removed {
            self.access
                .revoke_access_tracking(user_id)
                .await
                .map_err(access_error)?;
        }

        tracing::debug!(cleared = removed.len(), "Expirations cleared");
        Ok(removed.len())
    }

    /// The stored expiration, if any. Unparseable entries read as absent.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<Timestamp>, PatronageError> {
        let table = self.load().await?;
        let Some(raw) = table.get(user_id) else {
            return Ok(None);
        };

        match Timestamp::parse(raw) {
            Ok(ts) => Ok(Some(ts)),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    value = %raw,
                    error = %e,
                    "Ignoring unparseable expiration"
                );
                Ok(None)
            }
        }
    }

    /// True when no expiration is tracked or the stored instant has passed.
    pub async fn is_expired(&self, user_id: &UserId) -> Result<bool, PatronageError> {
        Ok(match self.get(user_id).await? {
            Some(until) => !self.clock.now().is_before(&until),
            None => true,
        })
    }

    async fn load(&self) -> Result<ExpirationTable, PatronageError> {
        load_blob(self.store.as_ref(), EXPIRATIONS_BLOB).await
    }

    async fn save(&self, table: &ExpirationTable) -> Result<(), PatronageError> {
        let json = serde_json::to_string(table)?;
        self.store.set(EXPIRATIONS_BLOB, &json).await?;
        Ok(())
    }
}
