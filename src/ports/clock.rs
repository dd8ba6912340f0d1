//! Clock Port - Source of "now" for expiration decisions.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
