//! Patronage handlers.
//!
//! Orchestration of the patron snapshot:
//!
//! - `MembershipReconciler` - Create/update/delete of single entries, and
//!   bulk pulls that follow pagination
//! - `SnapshotMerger` - Replace or append extracted payloads into the tables
//! - `ExpirationLedger` - Per-user timed access expirations
//! - `SnapshotTables` - Blob persistence of the four snapshot tables

mod expiration_ledger;
mod membership_reconciler;
mod snapshot_merger;
mod tables;

pub use expiration_ledger::ExpirationLedger;
pub use membership_reconciler::{MembershipReconciler, PullOutcome};
pub use snapshot_merger::{MergeMode, MergeOutcome, SnapshotMerger};
pub use tables::{
    SnapshotTables, DECLINES_BLOB, EXPIRATIONS_BLOB, PLEDGES_BLOB, REWARD_USERS_BLOB, USERS_BLOB,
};
