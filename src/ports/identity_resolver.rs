//! Identity Resolver Port - Maps upstream patrons to local accounts.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PatronId, UserId};

/// Port for looking up the local account linked to a patron
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a patron to a local user
    ///
    /// # Returns
    /// `None` if no local account is linked to this patron
    async fn resolve_local_user(&self, patron_id: &PatronId)
        -> Result<Option<UserId>, DomainError>;

    /// Resolve many patrons at once
    ///
    /// Patrons with no linked account are left out of the result. The
    /// default looks each patron up in turn; adapters backed by one table
    /// override it to read that table once.
    async fn resolve_local_users(
        &self,
        patron_ids: &[PatronId],
    ) -> Result<BTreeMap<PatronId, UserId>, DomainError> {
        let mut users = BTreeMap::new();
        for patron_id in patron_ids {
            if let Some(user_id) = self.resolve_local_user(patron_id).await? {
                users.insert(patron_id.clone(), user_id);
            }
        }
        Ok(users)
    }
}
