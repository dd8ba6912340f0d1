//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::patronage;
pub use handlers::patronage::{
    ExpirationLedger, MembershipReconciler, MergeMode, MergeOutcome, PullOutcome, SnapshotMerger,
};
