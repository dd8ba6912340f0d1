//! Identity adapters.
//!
//! Implementations of the `IdentityResolver` port:
//! - `StoredIdentityResolver` - Account links kept in a blob
//! - `StaticIdentityResolver` - Fixed table for development and tests

mod static_identity_resolver;
mod stored_identity_resolver;

pub use static_identity_resolver::StaticIdentityResolver;
pub use stored_identity_resolver::{StoredIdentityResolver, PATRON_ACCOUNTS_BLOB};
