//! Patron Sync - Subscription-state reconciliation
//!
//! This crate keeps a denormalized snapshot of patron state (pledge amounts,
//! payment declines, tier membership, emails, and timed-access expirations)
//! in step with a subscription-billing API, from both single webhook entries
//! and paginated bulk pulls.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
