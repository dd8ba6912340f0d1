//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `BlobStore` - Named blob persistence for every derived table
//! - `PatronApi` - Page fetches from the subscription-billing API
//! - `IdentityResolver` - Patron → local account lookup
//! - `AccessGrant` - Timed access grant/revoke side effects
//! - `Clock` - Current time

mod access_grant;
mod blob_store;
mod clock;
mod identity_resolver;
mod patron_api;

pub use access_grant::AccessGrant;
pub use blob_store::{BlobStore, BlobStoreError};
pub use clock::Clock;
pub use identity_resolver::IdentityResolver;
pub use patron_api::{PatronApi, PatronApiError};
