//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `patronage` - Pledge/membership records and the patron snapshot

pub mod foundation;
pub mod patronage;
