//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use super::server::Environment;

/// Which blob store backs the snapshot tables
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
    Redis,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Redis connection URL (redis backend)
    pub redis_url: Option<String>,

    /// Prefix for every Redis key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Directory holding blob files (file backend)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        match self.backend {
            StorageBackend::Memory if *environment == Environment::Production => {
                Err(ValidationError::MemoryStorageInProduction)
            }
            StorageBackend::Redis => {
                let url = self
                    .redis_url
                    .as_deref()
                    .filter(|url| !url.is_empty())
                    .ok_or(ValidationError::MissingRequired("STORAGE_REDIS_URL"))?;
                if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                    return Err(ValidationError::InvalidRedisUrl);
                }
                Ok(())
            }
            StorageBackend::File if self.data_dir.as_os_str().is_empty() => {
                Err(ValidationError::MissingRequired("STORAGE_DATA_DIR"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_key_prefix() -> String {
    "patron-sync:".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/patron-sync")
}
