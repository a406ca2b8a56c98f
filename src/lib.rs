// Catalog Sync - MongoDB to PostgreSQL catalog synchronization
// Copyright (c) 2025 Catalog Sync Contributors
// Licensed under the MIT License

//! # Catalog Sync - MongoDB to PostgreSQL
//!
//! Catalog Sync continuously mirrors marketplace catalog collections (offers,
//! products, shops and shop reviews) from MongoDB into a normalized
//! PostgreSQL schema. It needs no change stream and stores no cursor: every
//! pipeline re-scans its collection in fixed-size pages, forever, and
//! upserts each document by its external id.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Transformation, pipelines, dimension resolution, upserts, metrics
//! - [`adapters`] - Source and target store traits with MongoDB and PostgreSQL implementations
//! - [`domain`] - Identifiers, entity kinds, typed records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_sync::adapters::mongo::MongoSourceClient;
//! use catalog_sync::adapters::postgresql::PostgreSQLClient;
//! use catalog_sync::config::load_config;
//! use catalog_sync::core::metrics::CounterSink;
//! use catalog_sync::core::sync::Supervisor;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("catalog-sync.toml")?;
//!
//!     let source = Arc::new(MongoSourceClient::new(&config.source).await?);
//!     let target = Arc::new(PostgreSQLClient::new(config.target.clone()).await?);
//!     target.ensure_schema().await?;
//!
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         let _ = shutdown_tx.send(true);
//!     });
//!
//!     let metrics = Arc::new(CounterSink::new());
//!     Supervisor::new(
//!         config.sync.clone(),
//!         config.source.collections.clone(),
//!         source,
//!         target,
//!         metrics.clone(),
//!         shutdown_rx,
//!     )
//!     .run()
//!     .await;
//!
//!     print!("{}", metrics.render_prometheus());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Catalog Sync uses [`domain::SyncError`] for all errors. The pipeline
//! runner decides how far an error reaches: a malformed document or a
//! failed write costs one record, a failed count or page fetch restarts the
//! pass.
//!
//! ```rust,no_run
//! use catalog_sync::domain::SyncError;
//!
//! fn example() -> Result<(), SyncError> {
//!     let config = catalog_sync::config::load_config("catalog-sync.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
