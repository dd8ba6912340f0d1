//! SnapshotMerger - Folds extracted payloads into the persisted snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::foundation::{PatronId, UserId};
use crate::domain::patronage::{extract, identity_error, Payload, PatronSnapshot, PatronageError};
use crate::ports::IdentityResolver;

use super::expiration_ledger::ExpirationLedger;
use super::tables::SnapshotTables;

/// Starting point of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Start from empty tables (bulk pull).
    Replace,
    /// Start from the persisted tables (incremental update).
    Append,
}

/// Summary of a completed merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Patrons with a pledge after the merge.
    pub patrons: usize,
    /// Patrons with a failing charge after the merge.
    pub declines: usize,
    /// Reward buckets, not counting `"0"`.
    pub rewards: usize,
    /// Ledger entries dropped for patrons merged into a reward.
    pub expirations_cleared: usize,
}

impl MergeOutcome {
    fn of(snapshot: &PatronSnapshot) -> Self {
        Self {
            patrons: snapshot.pledges.len(),
            declines: snapshot.declines.len(),
            rewards: snapshot
                .reward_users
                .keys()
                .filter(|reward_id| !reward_id.is_all_patrons())
                .count(),
            expirations_cleared: 0,
        }
    }
}

/// Merges payloads into the four snapshot tables.
///
/// Patrons merged into a real reward bucket have their timed-access
/// expiration cleared once the snapshot is saved, since the reward now
/// carries their entitlement.
pub struct SnapshotMerger {
    tables: SnapshotTables,
    identity: Arc<dyn IdentityResolver>,
    ledger: Arc<ExpirationLedger>,
}

impl SnapshotMerger {
    pub fn new(
        tables: SnapshotTables,
        identity: Arc<dyn IdentityResolver>,
        ledger: Arc<ExpirationLedger>,
    ) -> Self {
        Self {
            tables,
            identity,
            ledger,
        }
    }

    /// Rebuilds the snapshot from `payloads` alone.
    pub async fn replace(&self, payloads: &[Payload]) -> Result<MergeOutcome, PatronageError> {
        self.merge(MergeMode::Replace, payloads).await
    }

    /// Folds one payload into the persisted snapshot.
    pub async fn append(&self, payload: &Payload) -> Result<MergeOutcome, PatronageError> {
        self.merge(MergeMode::Append, std::slice::from_ref(payload)).await
    }

    pub async fn merge(
        &self,
        mode: MergeMode,
        payloads: &[Payload],
    ) -> Result<MergeOutcome, PatronageError> {
        let mut snapshot = match mode {
            MergeMode::Replace => PatronSnapshot::new(),
            MergeMode::Append => self.tables.load().await?,
        };

        let mut entitled = BTreeSet::new();
        for payload in payloads {
            let partial = extract(payload);
            entitled.extend(partial.entitled_patrons());
            snapshot.absorb(partial);
        }
        snapshot.refresh_all_patrons_bucket();

        self.tables.save(&snapshot).await?;

        let users = self.resolve_users(&entitled).await?;
        let mut outcome = MergeOutcome::of(&snapshot);
        outcome.expirations_cleared = self.ledger.clear_all(&users).await?;

        tracing::info!(
            mode = ?mode,
            payloads = payloads.len(),
            patrons = outcome.patrons,
            declines = outcome.declines,
            rewards = outcome.rewards,
            expirations_cleared = outcome.expirations_cleared,
            "Snapshot merged"
        );

        Ok(outcome)
    }

    async fn resolve_users(
        &self,
        patrons: &BTreeSet<PatronId>,
    ) -> Result<Vec<UserId>, PatronageError> {
        let patrons: Vec<PatronId> = patrons.iter().cloned().collect();
        let users = self
            .identity
            .resolve_local_users(&patrons)
            .await
            .map_err(identity_error)?;
        Ok(users.into_values().collect())
    }
}
