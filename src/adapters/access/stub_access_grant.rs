//! Stub implementation of AccessGrant for development.
//!
//! Logs each call and succeeds. Swap in the real entitlement service
//! adapter for production deployments.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::AccessGrant;

/// AccessGrant that only logs.
#[derive(Debug, Clone, Default)]
pub struct StubAccessGrant;

impl StubAccessGrant {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccessGrant for StubAccessGrant {
    async fn grant_access_until(
        &self,
        user_id: &UserId,
        until: Timestamp,
    ) -> Result<(), DomainError> {
        tracing::info!(user_id = %user_id, until = %until, "Granting timed access");
        Ok(())
    }

    async fn revoke_access_tracking(&self, user_id: &UserId) -> Result<(), DomainError> {
        tracing::info!(user_id = %user_id, "Revoking timed access tracking");
        Ok(())
    }
}
