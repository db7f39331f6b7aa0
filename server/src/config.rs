//! Configuration management for the stockroom server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparseable numeric values fall back to their default.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use stockroom_core::RetryPolicy;
use stockroom_postgres::PoolConfig;

/// Which datastore backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `PostgreSQL` through `stockroom-postgres`
    Postgres,
    /// In-process store seeded with the sample catalog (`memory` feature)
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("Unknown STORE_BACKEND '{other}', expected 'postgres' or 'memory'"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selected datastore
    pub backend: StoreBackend,
    /// `PostgreSQL` configuration
    pub database: DatabaseConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Prometheus exporter configuration
    pub metrics: MetricsConfig,
    /// Order placement tuning
    pub orders: OrderConfig,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    #[serde(skip_serializing)]
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Pool acquire timeout in seconds
    pub connect_timeout: u64,
    /// Statement timeout in seconds
    pub statement_timeout: u64,
    /// Idle timeout in seconds
    pub idle_timeout: u64,
    /// Apply embedded migrations on start
    pub run_migrations: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Directory holding the static frontend
    pub static_dir: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to install the exporter
    pub enabled: bool,
    /// Metrics server host
    pub host: String,
    /// Metrics server port
    pub port: u16,
}

/// Order placement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Retries after a transient conflict
    pub max_retries: usize,
    /// First backoff delay in milliseconds
    pub retry_initial_delay_ms: u64,
    /// Upper bound on a single placement attempt in milliseconds
    pub transaction_timeout_ms: u64,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORE_BACKEND` names an unknown backend.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORE_BACKEND` names an unknown backend.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        fn parsed_with<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse().ok())
        }
        let flag = |key: &str, default: bool| {
            lookup(key).map_or(default, |s| {
                matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
            })
        };

        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let url = lookup("DATABASE_URL").unwrap_or_else(|| {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                lookup("DB_PASSWORD").unwrap_or_else(|| "postgres".to_string()),
                lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                lookup("DB_PORT").unwrap_or_else(|| "5432".to_string()),
                lookup("DB_NAME").unwrap_or_else(|| "inventory_db".to_string()),
            )
        });

        Ok(Self {
            backend,
            database: DatabaseConfig {
                url,
                max_connections: parsed_with(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(10),
                min_connections: parsed_with(&lookup, "DATABASE_MIN_CONNECTIONS").unwrap_or(2),
                connect_timeout: parsed_with(&lookup, "DATABASE_CONNECT_TIMEOUT").unwrap_or(30),
                statement_timeout: parsed_with(&lookup, "DATABASE_STATEMENT_TIMEOUT").unwrap_or(30),
                idle_timeout: parsed_with(&lookup, "DATABASE_IDLE_TIMEOUT").unwrap_or(600),
                run_migrations: flag("DATABASE_RUN_MIGRATIONS", true),
            },
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed_with(&lookup, "PORT").unwrap_or(3000),
                static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "frontend".to_string()),
                shutdown_timeout: parsed_with(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            metrics: MetricsConfig {
                enabled: flag("METRICS_ENABLED", true),
                host: lookup("METRICS_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed_with(&lookup, "METRICS_PORT").unwrap_or(9090),
            },
            orders: OrderConfig {
                max_retries: parsed_with(&lookup, "ORDER_MAX_RETRIES").unwrap_or(3),
                retry_initial_delay_ms: parsed_with(&lookup, "ORDER_RETRY_INITIAL_DELAY_MS").unwrap_or(20),
                transaction_timeout_ms: parsed_with(&lookup, "ORDER_TRANSACTION_TIMEOUT_MS").unwrap_or(5000),
            },
        })
    }

    /// HTTP bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// Pool settings for `stockroom-postgres`.
    #[must_use]
    pub const fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            acquire_timeout: Duration::from_secs(self.connect_timeout),
            statement_timeout: Duration::from_secs(self.statement_timeout),
            idle_timeout: Duration::from_secs(self.idle_timeout),
        }
    }
}

impl OrderConfig {
    /// Backoff policy for the placement transaction.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.retry_initial_delay_ms))
            .build()
    }

    /// Upper bound on a single placement attempt.
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }
}
