//! PostgreSQL client implementation
//!
//! This module provides the pooled client the PostgreSQL row source hands out
//! connections from.

use crate::config::SourceConfig;
use crate::domain::{DumpError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

/// PostgreSQL client for tabledump
///
/// Each export job takes its own connection from the pool, so the pool size
/// bounds how many tables are read at the same time.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Connection target without credentials, for logs and errors
    target: String,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until [`PostgreSQLClient::get_connection`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .dbname(&config.dbname)
            .application_name("tabledump")
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));
        if let Some(password) = &config.password {
            let password: &str = password.expose_secret().as_ref();
            pg_config.password(password);
        }

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .create_timeout(Some(Duration::from_secs(config.connect_timeout_seconds)))
            .build()
            .map_err(|e| {
                DumpError::Configuration(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self {
            pool,
            target: config.display_target(),
        })
    }

    /// Get a connection from the pool
    ///
    /// Waits for a free slot when every connection is in use.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Connection`] if a connection cannot be established.
    pub async fn get_connection(&self) -> Result<Object> {
        self.pool.get().await.map_err(|e| {
            DumpError::Connection(format!("Failed to connect to {}: {}", self.target, e))
        })
    }

    /// Connection target without credentials
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}
