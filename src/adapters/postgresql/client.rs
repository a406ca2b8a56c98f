//! PostgreSQL client implementation
//!
//! This module provides the pooled client for the relational target store.

use super::transaction::PostgresTransaction;
use crate::adapters::target::{TargetStore, TargetTransaction};
use crate::config::{redact_url, TargetConfig};
use crate::domain::{Result, SyncError, TargetError};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;

const CREATE_SCHEMA_SQL: &str = include_str!("../../../migrations/001_initial_schema.sql");
const DROP_SCHEMA_SQL: &str = include_str!("../../../migrations/000_drop_schema.sql");

/// PostgreSQL client for Catalog Sync
///
/// Owns a connection pool shared by every pipeline. Each record transaction
/// checks out one connection for its duration.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: TargetConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// # Arguments
    ///
    /// * `config` - Target store configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid, the TLS
    /// connector cannot be built, or the pool cannot be created.
    pub async fn new(config: TargetConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config =
            config.connection_string.expose_secret().parse().map_err(|e| {
                SyncError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        pg_config.application_name("catalog-sync");
        pg_config.connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            mode => {
                pg_config.ssl_mode(if mode == "require" {
                    SslMode::Require
                } else {
                    SslMode::Prefer
                });
                let connector = TlsConnector::builder().build().map_err(|e| {
                    TargetError::ConnectionFailed(format!("Failed to build TLS connector: {}", e))
                })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                TargetError::ConnectionFailed(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Get a connection from the pool
    ///
    /// # Errors
    ///
    /// Returns `TargetError::PoolExhausted` if no connection became available
    /// within the configured timeout.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            TargetError::PoolExhausted(format!("Failed to get connection from pool: {}", e)).into()
        })
    }

    /// Create every table, index and constraint the engine writes to
    ///
    /// Idempotent; safe to run against an already provisioned database.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .batch_execute(CREATE_SCHEMA_SQL)
            .await
            .map_err(|e| TargetError::ExecFailed(format!("Failed to create schema: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Drop every table the engine owns
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub async fn drop_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .batch_execute(DROP_SCHEMA_SQL)
            .await
            .map_err(|e| TargetError::ExecFailed(format!("Failed to drop schema: {}", e)))?;

        tracing::warn!("PostgreSQL schema dropped");
        Ok(())
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        redact_url(self.config.connection_string.expose_secret().as_ref())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

#[async_trait]
impl TargetStore for PostgreSQLClient {
    async fn ping(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| TargetError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        tracing::info!(
            target_uri = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn TargetTransaction>> {
        let client = self.get_connection().await?;

        let begin = format!(
            "BEGIN; SET LOCAL statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .batch_execute(&begin)
            .await
            .map_err(|e| TargetError::ConnectionFailed(format!("BEGIN failed: {}", e)))?;

        Ok(Box::new(PostgresTransaction::new(client)))
    }
}
