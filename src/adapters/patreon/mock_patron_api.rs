//! Mock billing API for testing.
//!
//! Serves pre-configured pages by URI and records every fetch, so tests can
//! assert on pagination order. Supports:
//! - Pre-configured page bodies
//! - Empty responses
//! - Error injection per URI

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{PatronApi, PatronApiError};

/// Mock billing API.
///
/// # Example
///
/// ```ignore
/// let api = MockPatronApi::new();
/// api.set_page("A", json!({"data": [], "links": {"next": "B"}}));
/// api.set_page("B", json!({"data": []}));
///
/// reconciler.pull(["A"]).await?;
/// assert_eq!(api.fetched(), vec!["A", "B"]);
/// ```
#[derive(Clone, Default)]
pub struct MockPatronApi {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    call_log: Vec<String>,
}

#[derive(Clone)]
enum MockResponse {
    Page(Value),
    Empty,
    Status(u16),
}

impl MockPatronApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `uri`.
    pub fn set_page(&self, uri: impl Into<String>, body: Value) {
        self.insert(uri, MockResponse::Page(body));
    }

    /// Answer `uri` with no body.
    pub fn set_empty(&self, uri: impl Into<String>) {
        self.insert(uri, MockResponse::Empty);
    }

    /// Fail `uri` with an HTTP status.
    pub fn set_status(&self, uri: impl Into<String>, status: u16) {
        self.insert(uri, MockResponse::Status(status));
    }

    /// URIs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.lock().call_log.clone()
    }

    fn insert(&self, uri: impl Into<String>, response: MockResponse) {
        self.lock().responses.insert(uri.into(), response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the call log from others.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PatronApi for MockPatronApi {
    async fn fetch_page(&self, uri: &str) -> Result<Option<Value>, PatronApiError> {
        let mut state = self.lock();
        state.call_log.push(uri.to_string());

        match state.responses.get(uri).cloned() {
            Some(MockResponse::Page(body)) => Ok(Some(body)),
            Some(MockResponse::Empty) => Ok(None),
            Some(MockResponse::Status(status)) => Err(PatronApiError::Status(status)),
            None => Err(PatronApiError::Status(404)),
        }
    }
}
