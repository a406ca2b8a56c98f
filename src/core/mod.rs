//! Core business logic for Catalog Sync.
//!
//! # Modules
//!
//! - [`transform`] - Raw documents to typed records
//! - [`sync`] - Pipelines, record transactions, dimension resolution and upserts
//! - [`metrics`] - Per-record success and failure counters
//!
//! # Sync Workflow
//!
//! Every enabled entity kind runs its own pipeline:
//!
//! 1. **Count**: Ask the source how many documents the collection holds
//! 2. **Page**: Fetch windows of 1000 documents over `[0, count)`
//! 3. **Transform**: Validate and type each document
//! 4. **Write**: Resolve dimensions, upsert the row, commit, one transaction per record
//! 5. **Repeat**: After the idle interval, start again from a fresh count
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_sync::adapters::mongo::MongoSourceClient;
//! use catalog_sync::adapters::postgresql::PostgreSQLClient;
//! use catalog_sync::config::load_config;
//! use catalog_sync::core::metrics::CounterSink;
//! use catalog_sync::core::sync::Supervisor;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("catalog-sync.toml")?;
//! let source = Arc::new(MongoSourceClient::new(&config.source).await?);
//! let target = Arc::new(PostgreSQLClient::new(config.target.clone()).await?);
//! let metrics = Arc::new(CounterSink::new());
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let report = Supervisor::new(
//!     config.sync.clone(),
//!     config.source.collections.clone(),
//!     source,
//!     target,
//!     metrics.clone(),
//!     shutdown_rx,
//! )
//! .run()
//! .await;
//!
//! println!("{}", metrics.render_prometheus());
//! # Ok(())
//! # }
//! ```

pub mod metrics;
pub mod sync;
pub mod transform;
