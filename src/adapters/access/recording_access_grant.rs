//! AccessGrant that records every call for assertions in tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::AccessGrant;

/// One call made against the access grant port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCall {
    Granted { user: UserId, until: Timestamp },
    Revoked { user: UserId },
}

/// Recording AccessGrant.
///
/// Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingAccessGrant {
    calls: Arc<Mutex<Vec<AccessCall>>>,
    fail: bool,
}

impl RecordingAccessGrant {
    pub fn new() -> Self {
        Self::default()
    }

    /// A grant port that rejects every call (for failure-path tests).
    pub fn failing() -> Self {
        Self {
            calls: Arc::default(),
            fail: true,
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<AccessCall> {
        self.lock().clone()
    }

    fn record(&self, call: AccessCall) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::new(
                ErrorCode::AccessGrantFailed,
                "Access service unavailable",
            ));
        }
        self.lock().push(call);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AccessCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AccessGrant for RecordingAccessGrant {
    async fn grant_access_until(
        &self,
        user_id: &UserId,
        until: Timestamp,
    ) -> Result<(), DomainError> {
        self.record(AccessCall::Granted {
            user: user_id.clone(),
            until,
        })
    }

    async fn revoke_access_tracking(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.record(AccessCall::Revoked {
            user: user_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let grant = RecordingAccessGrant::new();
        let user = UserId::new("u1").unwrap();
        let until = Timestamp::parse("2024-02-01T00:00:00Z").unwrap();

        grant.grant_access_until(&user, until).await.unwrap();
        grant.revoke_access_tracking(&user).await.unwrap();

        assert_eq!(
            grant.calls(),
            vec![
                AccessCall::Granted {
                    user: user.clone(),
                    until
                },
                AccessCall::Revoked { user },
            ]
        );
    }

    #[tokio::test]
    async fn failing_grant_reports_access_error() {
        let grant = RecordingAccessGrant::failing();
        let err = grant
            .revoke_access_tracking(&UserId::new("u1").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AccessGrantFailed);
        assert!(grant.calls().is_empty());
    }
}
