//! Billing API configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Billing API configuration (Patreon)
#[derive(Debug, Clone, Deserialize)]
pub struct PatreonConfig {
    /// Creator access token
    pub access_token: SecretString,

    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Campaign whose members are pulled
    pub campaign_id: String,

    /// Members requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PatreonConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// First page of the campaign members listing, with tiers and user
    /// emails side-loaded.
    pub fn members_uri(&self) -> String {
        format!(
            "{}/api/oauth2/v2/campaigns/{}/members\
             ?include=user,currently_entitled_tiers\
             &fields%5Bmember%5D=pledge_amount_cents,last_charge_status,last_charge_date,pledge_cadence\
             &fields%5Buser%5D=email\
             &page%5Bcount%5D={}",
            self.api_base_url.trim_end_matches('/'),
            self.campaign_id,
            self.page_size
        )
    }

    /// Validate billing API configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PATREON_ACCESS_TOKEN"));
        }
        if self.campaign_id.is_empty() {
            return Err(ValidationError::MissingRequired("PATREON_CAMPAIGN_ID"));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        if *environment == Environment::Production && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::ApiBaseUrlMustBeHttps);
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(ValidationError::InvalidPageSize);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://www.patreon.com".to_string()
}

fn default_page_size() -> u32 {
    500
}

fn default_request_timeout() -> u64 {
    30
}
