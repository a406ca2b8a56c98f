//! External system integrations for Catalog Sync.
//!
//! - [`source`] - Source store abstraction ([`source::SourceStore`])
//! - [`target`] - Target store abstraction ([`target::TargetStore`], [`target::TargetTransaction`])
//! - [`mongo`] - MongoDB implementation of the source store
//! - [`postgresql`] - PostgreSQL implementation of the target store
//!
//! # Design Pattern
//!
//! The engine only sees the traits. Driver types stay inside the concrete
//! adapters, which lets the pipelines run against in-memory stores in tests.
//!
//! ```rust,no_run
//! use catalog_sync::adapters::mongo::MongoSourceClient;
//! use catalog_sync::adapters::postgresql::PostgreSQLClient;
//! use catalog_sync::adapters::source::SourceStore;
//! use catalog_sync::adapters::target::TargetStore;
//! use catalog_sync::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("catalog-sync.toml")?;
//! let source = MongoSourceClient::new(&config.source).await?;
//! let target = PostgreSQLClient::new(config.target.clone()).await?;
//!
//! source.ping().await?;
//! target.ping().await?;
//! # Ok(())
//! # }
//! ```

pub mod mongo;
pub mod postgresql;
pub mod source;
pub mod target;
