//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid page size (must be 1-1000)")]
    InvalidPageSize,

    #[error("Invalid API base URL")]
    InvalidApiBaseUrl,

    #[error("API base URL must use HTTPS in production")]
    ApiBaseUrlMustBeHttps,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("In-memory storage is not allowed in production")]
    MemoryStorageInProduction,
}
