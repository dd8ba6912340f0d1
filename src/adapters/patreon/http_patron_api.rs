//! HTTP adapter for the billing API.
//!
//! Implements the `PatronApi` port over `reqwest`. Requests carry the
//! creator access token as a bearer token; the token is held as a
//! `secrecy::SecretString` and only exposed when building a request.
//!
//! # Configuration
//!
//! ```ignore
//! let config = PatreonClientConfig::new(access_token)
//!     .with_base_url("https://www.patreon.com")
//!     .with_timeout(Duration::from_secs(30));
//! let api = HttpPatronApi::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::ports::{PatronApi, PatronApiError};

const DEFAULT_BASE_URL: &str = "https://www.patreon.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Billing API client configuration.
#[derive(Clone)]
pub struct PatreonClientConfig {
    /// Creator access token.
    access_token: SecretString,

    /// Base URL that relative page URIs are resolved against.
    api_base_url: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl PatreonClientConfig {
    /// Create a configuration with the default base URL and timeout.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for a page URI. `links.next` values are already
    /// absolute; seed URIs may be paths.
    pub fn resolve(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return uri.to_string();
        }
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            uri.trim_start_matches('/')
        )
    }
}

/// `PatronApi` over HTTP.
pub struct HttpPatronApi {
    config: PatreonClientConfig,
    http_client: reqwest::Client,
}

impl HttpPatronApi {
    /// Create a new client with the given configuration.
    pub fn new(config: PatreonClientConfig) -> Result<Self, PatronApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PatronApiError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl PatronApi for HttpPatronApi {
    async fn fetch_page(&self, uri: &str) -> Result<Option<Value>, PatronApiError> {
        let url = self.config.resolve(uri);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Billing API request failed");
                PatronApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "Billing API returned error status"
            );
            return Err(PatronApiError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PatronApiError::Transport(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| PatronApiError::InvalidBody(e.to_string()))
    }
}
