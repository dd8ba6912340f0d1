//! Fixed identity table for development and testing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PatronId, UserId};
use crate::ports::IdentityResolver;

/// `IdentityResolver` over a fixed in-memory table.
///
/// ```ignore
/// let resolver = StaticIdentityResolver::new()
///     .with_link(patron_id, user_id);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    links: HashMap<PatronId, UserId>,
}

impl StaticIdentityResolver {
    /// Create a resolver that knows no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, patron_id: PatronId, user_id: UserId) -> Self {
        self.links.insert(patron_id, user_id);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve_local_user(
        &self,
        patron_id: &PatronId,
    ) -> Result<Option<UserId>, DomainError> {
        Ok(self.links.get(patron_id).cloned())
    }
}
