//! Strongly-typed identifier value objects.
//!
//! Upstream identifiers are opaque strings, so every id here wraps a
//! non-empty `String` and serializes transparently. That keeps them usable
//! as JSON object keys in the persisted tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new id, returning error if empty.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Upstream identifier of a patron (the billing platform's user id).
    PatronId,
    "patron_id"
);

string_id!(
    /// Upstream identifier of a reward or tier.
    RewardId,
    "reward_id"
);

string_id!(
    /// Identifier of a local account.
    UserId,
    "user_id"
);

impl RewardId {
    /// Key of the synthetic bucket that holds every pledging patron.
    pub const ALL_PATRONS: &'static str = "0";

    /// The synthetic "any reward" bucket.
    pub fn all_patrons() -> Self {
        Self(Self::ALL_PATRONS.to_string())
    }

    /// True for the synthetic "any reward" bucket.
    pub fn is_all_patrons(&self) -> bool {
        self.0 == Self::ALL_PATRONS
    }
}
