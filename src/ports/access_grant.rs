//! Access Grant Port - Timed access side effects.
//!
//! The expiration ledger calls this port whenever it records or drops an
//! expiration, so whatever enforces access stays in step with the ledger.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Port for granting and revoking timed access
#[async_trait]
pub trait AccessGrant: Send + Sync {
    /// Grant access that lapses at `until` unless renewed
    async fn grant_access_until(&self, user_id: &UserId, until: Timestamp)
        -> Result<(), DomainError>;

    /// Stop tracking timed access for a user (their entitlement is now
    /// carried by an active reward)
    async fn revoke_access_tracking(&self, user_id: &UserId) -> Result<(), DomainError>;
}
