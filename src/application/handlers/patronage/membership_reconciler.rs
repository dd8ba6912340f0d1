//! MembershipReconciler - Entry lifecycle and bulk pulls.
//!
//! Single-entry events (webhooks) go through `create`, `update` and `delete`;
//! the scheduled sync job goes through `pull`. Operations are sequences of
//! awaited reads followed by awaited writes against the same tables, so
//! callers must not run two of them concurrently against one store.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde_json::Value;

use crate::domain::foundation::PatronId;
use crate::domain::patronage::{identity_error, Entry, EntryEnvelope, Payload, PatronageError};
use crate::ports::{AccessGrant, BlobStore, Clock, IdentityResolver, PatronApi};

use super::expiration_ledger::ExpirationLedger;
use super::snapshot_merger::{MergeOutcome, SnapshotMerger};
use super::tables::SnapshotTables;

/// Summary of a completed bulk pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullOutcome {
    /// Pages fetched and merged.
    pub pages: usize,
    pub merge: MergeOutcome,
}

/// Keeps the patron snapshot in step with upstream membership changes.
pub struct MembershipReconciler {
    tables: SnapshotTables,
    merger: SnapshotMerger,
    ledger: Arc<ExpirationLedger>,
    api: Arc<dyn PatronApi>,
    identity: Arc<dyn IdentityResolver>,
    clock: Arc<dyn Clock>,
}

impl MembershipReconciler {
    pub fn new(
        store: Arc<dyn BlobStore>,
        api: Arc<dyn PatronApi>,
        identity: Arc<dyn IdentityResolver>,
        access: Arc<dyn AccessGrant>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tables = SnapshotTables::new(store.clone());
        let ledger = Arc::new(ExpirationLedger::new(store, access, clock.clone()));
        let merger = SnapshotMerger::new(tables.clone(), identity.clone(), ledger.clone());

        Self {
            tables,
            merger,
            ledger,
            api,
            identity,
            clock,
        }
    }

    /// The expiration ledger this reconciler maintains.
    pub fn ledger(&self) -> &ExpirationLedger {
        &self.ledger
    }

    /// Merges one new entry into the persisted snapshot.
    pub async fn create(&self, envelope: &EntryEnvelope) -> Result<MergeOutcome, PatronageError> {
        self.merger.append(&envelope.to_payload()).await
    }

    /// Replaces everything known about the entry's patron with the entry.
    pub async fn update(&self, envelope: &EntryEnvelope) -> Result<MergeOutcome, PatronageError> {
        self.delete(envelope).await?;
        self.create(envelope).await
    }

    /// Removes the entry's patron from the snapshot.
    ///
    /// The patron leaves only the reward buckets the entry names. If the
    /// entry reports a paid charge whose coverage reaches into the future,
    /// the linked user keeps timed access until the coverage ends.
    pub async fn delete(&self, envelope: &EntryEnvelope) -> Result<(), PatronageError> {
        let entry = Entry::decode(&envelope.data)
            .map_err(|e| PatronageError::MalformedEntry(e.to_string()))?;
        let patron_id = entry.patron_id().ok_or_else(|| {
            PatronageError::MalformedEntry("entry does not identify a patron".to_string())
        })?;

        let mut snapshot = self.tables.load().await?;
        snapshot.leave_rewards(&patron_id, &entry.reward_ids());

        self.keep_paid_coverage(&entry, &patron_id).await?;

        snapshot.forget_patron(&patron_id);
        snapshot.refresh_all_patrons_bucket();
        self.tables.save(&snapshot).await?;

        tracing::info!(patron_id = %patron_id, "Patron removed from snapshot");
        Ok(())
    }

    /// Fetches every page reachable from `initial_uris` by following
    /// `links.next`, then rebuilds the snapshot from them.
    ///
    /// Nothing is written unless every page is fetched successfully.
    pub async fn pull<I, S>(&self, initial_uris: I) -> Result<PullOutcome, PatronageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut worklist: VecDeque<String> = initial_uris.into_iter().map(Into::into).collect();
        let mut visited = HashSet::new();
        let mut pages = Vec::new();

        while let Some(uri) = worklist.pop_front() {
            if !visited.insert(uri.clone()) {
                tracing::debug!(uri = %uri, "Skipping already fetched page");
                continue;
            }

            tracing::debug!(uri = %uri, "Fetching page");
            let page = self.fetch_page(&uri).await?;
            if let Some(next) = page.next_page() {
                worklist.push_back(next.to_string());
            }
            pages.push(page);
        }

        let merge = self.merger.replace(&pages).await?;
        tracing::info!(pages = pages.len(), patrons = merge.patrons, "Pull complete");

        Ok(PullOutcome {
            pages: pages.len(),
            merge,
        })
    }

    async fn fetch_page(&self, uri: &str) -> Result<Payload, PatronageError> {
        let body = self
            .api
            .fetch_page(uri)
            .await
            .map_err(|e| PatronageError::upstream(uri, e.to_string()))?;

        let body = match body {
            None => return Err(PatronageError::upstream(uri, "empty response")),
            Some(Value::Object(map)) if map.is_empty() => {
                return Err(PatronageError::upstream(uri, "empty response object"))
            }
            Some(Value::Object(map)) => map,
            Some(_) => return Err(PatronageError::upstream(uri, "response is not a JSON object")),
        };

        if let Some(error) = body.get("errors").or_else(|| body.get("error")) {
            return Err(PatronageError::upstream(
                uri,
                format!("upstream reported an error: {}", error),
            ));
        }

        Payload::from_value(Value::Object(body))
            .map_err(|e| PatronageError::upstream(uri, format!("malformed page: {}", e)))
    }

    /// Records the paid coverage window for the patron's linked user.
    async fn keep_paid_coverage(
        &self,
        entry: &Entry,
        patron_id: &PatronId,
    ) -> Result<(), PatronageError> {
        let until = match entry.coverage_end() {
            Ok(Some(until)) => until,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!(
                    patron_id = %patron_id,
                    error = %e,
                    "Ignoring unparseable charge date"
                );
                return Ok(());
            }
        };

        if !until.is_after(&self.clock.now()) {
            return Ok(());
        }

        let user_id = self
            .identity
            .resolve_local_user(patron_id)
            .await
            .map_err(identity_error)?;
        if let Some(user_id) = user_id {
            self.ledger.set(&user_id, until).await?;
        }
        Ok(())
    }
}
