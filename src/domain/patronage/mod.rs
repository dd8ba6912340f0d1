//! Patronage domain module.
//!
//! Pure logic for turning billing-API payloads into the denormalized patron
//! snapshot.
//!
//! # Module Structure
//!
//! - `payload` - Listing page and webhook envelopes
//! - `entry` - Typed `pledge`/`member` records
//! - `extract` - Payload → partial snapshot
//! - `snapshot` - Snapshot tables and merge rules
//! - `errors` - Reconciliation error taxonomy

mod entry;
mod errors;
mod extract;
mod payload;
mod snapshot;

pub use entry::{
    ChargeStatus, Entry, MemberAttributes, MemberRecord, MemberRelationships, PledgeAttributes,
    PledgeRecord, PledgeRelationships, Relationship, RelationshipList, ResourceRef,
    DEFAULT_PLEDGE_CADENCE_MONTHS,
};
pub use errors::PatronageError;
pub(crate) use errors::{access_error, identity_error};
pub use extract::extract;
pub use payload::{EntryEnvelope, Links, Payload};
pub use snapshot::{DeclineTable, PatronSnapshot, PledgeTable, RewardUserIndex, UserEmailTable};
