//! Envelope shapes consumed from the billing API.
//!
//! Two envelopes arrive from upstream:
//!
//! - **Listing page** - `{"data": [...], "included": [...], "links": {"next": ...}}`
//! - **Webhook entry** - `{"data": {...}, "included": [...]}`
//!
//! Entries inside `data` and `included` are kept as raw JSON here and decoded
//! one at a time, so a single malformed record never fails the envelope.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// One listing page (or any payload with a `data` section).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Payload {
    /// Raw entries. A single object is normalized into a one-element list;
    /// absent, null, and empty sections become an empty list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub data: Vec<Value>,

    /// Raw side-loaded records (users, tiers, campaigns).
    #[serde(default, deserialize_with = "array_or_empty")]
    pub included: Vec<Value>,

    #[serde(default)]
    pub links: Option<Links>,
}

/// Pagination links of a listing page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

impl Payload {
    /// Decodes a payload from a raw JSON document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The next page to fetch, if upstream advertised a non-empty one.
    pub fn next_page(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.next.as_deref())
            .filter(|next| !next.trim().is_empty())
    }

    /// True when the payload carries no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A single-entry webhook envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntryEnvelope {
    pub data: Value,

    #[serde(default, deserialize_with = "array_or_empty")]
    pub included: Vec<Value>,
}

impl EntryEnvelope {
    /// Wraps a bare entry with no side-loaded records.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            included: Vec::new(),
        }
    }

    /// Decodes an envelope from a raw JSON document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The envelope as a one-entry payload, ready for extraction.
    pub fn to_payload(&self) -> Payload {
        let data = match &self.data {
            Value::Object(map) if !map.is_empty() => vec![self.data.clone()],
            _ => Vec::new(),
        };
        Payload {
            data,
            included: self.included.clone(),
            links: None,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Object(map)) if map.is_empty() => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(vec![Value::Object(map)]),
        Some(other) => Err(de::Error::custom(format!(
            "expected object or array for `data`, got {}",
            other
        ))),
    }
}

fn array_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}
