//! patron-sync - Scheduled bulk sync of the patron snapshot.
//!
//! Pulls every page of the campaign members listing and rebuilds the
//! snapshot tables from them. Exits non-zero when the pull fails, so the
//! scheduler can retry later.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use patron_sync::adapters::access::StubAccessGrant;
use patron_sync::adapters::identity::StoredIdentityResolver;
use patron_sync::adapters::patreon::{HttpPatronApi, PatreonClientConfig};
use patron_sync::adapters::storage::{FileBlobStore, InMemoryBlobStore, RedisBlobStore};
use patron_sync::adapters::SystemClock;
use patron_sync::application::MembershipReconciler;
use patron_sync::config::{AppConfig, ConfigError, StorageBackend, StorageConfig};
use patron_sync::domain::patronage::PatronageError;
use patron_sync::ports::{BlobStore, PatronApiError};
use secrecy::ExposeSecret;

#[derive(Debug, Error)]
enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Billing API client setup failed: {0}")]
    Client(#[from] PatronApiError),

    #[error(transparent)]
    Pull(#[from] PatronageError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("patron-sync: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let retryable = matches!(&e, SyncError::Pull(err) if err.is_retryable());
            tracing::error!(error = %e, retryable, "Patron sync failed");
            ExitCode::FAILURE
        }
    }
}

/// JSON logs in production, human-readable otherwise.
fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

async fn run(config: &AppConfig) -> Result<(), SyncError> {
    let store = build_store(&config.storage).await?;

    let api = HttpPatronApi::new(
        PatreonClientConfig::new(config.patreon.access_token.expose_secret().as_str())
            .with_base_url(config.patreon.api_base_url.clone())
            .with_timeout(config.patreon.request_timeout()),
    )?;

    let reconciler = MembershipReconciler::new(
        store.clone(),
        Arc::new(api),
        Arc::new(StoredIdentityResolver::new(store)),
        Arc::new(StubAccessGrant::new()),
        Arc::new(SystemClock),
    );

    let members_uri = config.patreon.members_uri();
    tracing::info!(campaign_id = %config.patreon.campaign_id, "Starting patron sync");

    let outcome = reconciler.pull([members_uri]).await?;
    tracing::info!(
        pages = outcome.pages,
        patrons = outcome.merge.patrons,
        declines = outcome.merge.declines,
        rewards = outcome.merge.rewards,
        expirations_cleared = outcome.merge.expirations_cleared,
        "Patron sync finished"
    );
    Ok(())
}

async fn build_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, SyncError> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::Memory => Arc::new(InMemoryBlobStore::new()),
        StorageBackend::File => Arc::new(FileBlobStore::new(&config.data_dir)),
        StorageBackend::Redis => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            let client = redis::Client::open(url)?;
            let conn = client.get_multiplexed_tokio_connection().await?;
            Arc::new(RedisBlobStore::new(conn, config.key_prefix.clone()))
        }
    };
    tracing::debug!(backend = ?config.backend, "Blob store ready");
    Ok(store)
}
