//! Billing API adapters.
//!
//! Implements the `PatronApi` port:
//! - `HttpPatronApi` - `reqwest` client with bearer-token auth
//! - `MockPatronApi` - Scripted pages for tests
//!
//! # Configuration
//!
//! Required environment variables:
//! - `PATRON_SYNC__PATREON__ACCESS_TOKEN`: Creator access token

mod http_patron_api;
mod mock_patron_api;

pub use http_patron_api::{HttpPatronApi, PatreonClientConfig};
pub use mock_patron_api::MockPatronApi;
