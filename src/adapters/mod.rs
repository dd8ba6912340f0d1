//! Adapters - Implementations of port interfaces.
//!
//! - `storage` - Blob stores (memory, file, Redis)
//! - `patreon` - Billing API client and mock
//! - `identity` - Patron → account resolvers
//! - `access` - Access grant side effects
//! - `clock` - System and fixed clocks

pub mod access;
pub mod clock;
pub mod identity;
pub mod patreon;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
