//! # Stockroom Server
//!
//! Wires configuration, the selected datastore and the HTTP router into a
//! running process. The binary in `main.rs` is a thin shell over this crate.

pub mod config;

pub use config::{Config, StoreBackend};

use std::path::Path;
use std::sync::Arc;
use stockroom_core::store::InventoryStore;
use stockroom_core::{OrderPlacementService, SystemClock};
use stockroom_postgres::PostgresStore;
#[cfg(feature = "memory")]
use stockroom_testing::InMemoryStore;
use stockroom_web::{AppState, build_router};
use tracing::info;

/// Open the configured datastore, applying migrations when enabled.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or a migration fails,
/// or if the memory backend is selected in a build without the `memory`
/// feature.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn InventoryStore>> {
    match config.backend {
        #[cfg(feature = "memory")]
        StoreBackend::Memory => {
            info!("Using in-memory store with the sample catalog");
            Ok(Arc::new(InMemoryStore::with_sample_data()))
        }
        #[cfg(not(feature = "memory"))]
        StoreBackend::Memory => {
            anyhow::bail!("STORE_BACKEND=memory requires a build with the `memory` feature")
        }
        StoreBackend::Postgres => {
            info!(
                max_connections = config.database.max_connections,
                "Connecting to PostgreSQL..."
            );
            let store =
                PostgresStore::connect(&config.database.url, &config.database.pool_config())
                    .await?;
            info!("PostgreSQL connected");

            if config.database.run_migrations {
                info!("Running database migrations...");
                store.migrate().await?;
                info!("Migrations complete");
            }
            Ok(Arc::new(store))
        }
    }
}

/// Build the full application router over `store`.
pub fn build_app(config: &Config, store: Arc<dyn InventoryStore>) -> axum::Router {
    let orders = OrderPlacementService::new(store, Arc::new(SystemClock))
        .with_retry_policy(config.orders.retry_policy())
        .with_attempt_timeout(config.orders.attempt_timeout());

    let static_dir = Path::new(&config.server.static_dir);
    let static_dir = static_dir.is_dir().then_some(static_dir);
    if static_dir.is_none() {
        info!(dir = %config.server.static_dir, "Static directory not found, serving API only");
    }

    build_router(AppState::new(orders), static_dir)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        () = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    fn memory_config() -> Config {
        Config::from_lookup(|key| (key == "STORE_BACKEND").then(|| "memory".to_string())).unwrap()
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_memory_backend_opens_seeded_store() {
        use stockroom_core::store::CatalogStore;

        let store = open_store(&memory_config()).await.unwrap();

        assert_eq!(store.list_products().await.unwrap().len(), 5);
        store.ping().await.unwrap();
    }

    #[cfg(not(feature = "memory"))]
    #[tokio::test]
    async fn test_memory_backend_needs_feature() {
        let Err(err) = open_store(&memory_config()).await else {
            panic!("memory backend opened without the feature");
        };
        assert!(err.to_string().contains("`memory` feature"));
    }
}
