//! Configuration management for Catalog Sync.
//!
//! Catalog Sync reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CATALOG_SYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! connection_string = "${MONGO_URI}"
//! database = "main"
//!
//! [target]
//! connection_string = "${CATALOG_SYNC_PG_URI}"
//! max_connections = 10
//!
//! [sync]
//! entities = ["offer", "product", "shop", "shop_review"]
//! idle_interval_seconds = 5
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`SourceConfig`] - MongoDB connection and collection names
//! - [`TargetConfig`] - PostgreSQL connection pool
//! - [`SyncSettings`] - Pipelines, idle interval, retries, shutdown timeout
//! - [`LoggingConfig`] - Local file logging

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_entity_list};
pub use schema::{
    ApplicationConfig, CollectionNames, LoggingConfig, SourceConfig, SyncConfig, SyncSettings,
    TargetConfig,
};
pub use secret::{redact_url, secret_string, SecretString, SecretValue};
