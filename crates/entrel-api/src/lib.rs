//! Entrel API
//!
//! HTTP surface over the entity registry: person and company CRUD,
//! relations between persons, and share purchases.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ApiConfig;
use entrel_store::{MemoryStore, StoreError};
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Snapshot could not be loaded or saved
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Open the store described by the configuration
///
/// Loads the snapshot if one is configured and present, otherwise starts
/// empty.
pub fn open_store(config: &ApiConfig) -> Result<MemoryStore, ServerError> {
    match &config.snapshot_path {
        Some(path) if path.exists() => Ok(MemoryStore::load_snapshot(
            path,
            config.ownership_retention,
        )?),
        Some(path) => {
            info!("No snapshot at {}, starting empty", path.display());
            Ok(MemoryStore::with_retention(config.ownership_retention))
        }
        None => Ok(MemoryStore::with_retention(config.ownership_retention)),
    }
}

/// Start the HTTP server
///
/// Initializes tracing, opens the store, and serves until Ctrl-C. On
/// shutdown the store is written back to the configured snapshot path.
pub async fn start_server(config: ApiConfig) -> Result<(), ServerError> {
    // Initialize tracing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .try_init();

    info!("Starting Entrel server");
    info!("Bind address: {}", config.bind_addr());
    info!("Ownership retention: {:?}", config.ownership_retention);

    let store = Arc::new(open_store(&config)?);
    let app = create_router(AppState::new(Arc::clone(&store)));

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    if let Some(path) = &config.snapshot_path {
        store.save_snapshot(path)?;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use entrel_domain::traits::EntityRegistry;
    use entrel_domain::EntityId;

    #[test]
    fn test_open_store_without_snapshot() {
        let config = ApiConfig::default_test_config();
        let store = open_store(&config).unwrap();
        assert_eq!(store.stats().unwrap().persons, 0);
    }

    #[test]
    fn test_open_store_with_missing_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ApiConfig::default_test_config();
        config.snapshot_path = Some(dir.path().join("state.json"));

        let store = open_store(&config).unwrap();
        assert_eq!(store.stats().unwrap().companies, 0);
    }

    #[test]
    fn test_open_store_loads_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let original = MemoryStore::new();
        original.create_company(EntityId::new(5), "Acme").unwrap();
        original.save_snapshot(&path).unwrap();

        let mut config = ApiConfig::default_test_config();
        config.snapshot_path = Some(path);

        let store = open_store(&config).unwrap();
        assert!(store.get_company(EntityId::new(5)).unwrap().is_some());
    }
}
