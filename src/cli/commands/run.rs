//! Run command implementation
//!
//! This module implements the `run` command: connect to both stores, check
//! they answer, then run one pipeline per enabled entity kind until shutdown.

use crate::adapters::mongo::MongoSourceClient;
use crate::adapters::postgresql::PostgreSQLClient;
use crate::adapters::source::SourceStore;
use crate::adapters::target::TargetStore;
use crate::config::{load_config, parse_entity_list};
use crate::core::metrics::CounterSink;
use crate::core::sync::Supervisor;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the enabled entity kinds (comma-separated: offer,product,shop,shop_review)
    #[arg(long)]
    pub entities: Option<String>,

    /// Stop each pipeline after this many passes
    #[arg(long)]
    pub passes: Option<u64>,

    /// Create missing tables before starting
    #[arg(long)]
    pub provision: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        if let Some(entities) = &self.entities {
            match parse_entity_list(entities) {
                Ok(kinds) => {
                    tracing::info!(entities = ?kinds, "Overriding entities from CLI");
                    config.sync.entities = kinds;
                }
                Err(e) => {
                    eprintln!("Invalid --entities: {e}");
                    return Ok(2);
                }
            }
        }

        if let Some(passes) = self.passes {
            config.sync.max_passes = Some(passes);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let source = match MongoSourceClient::new(&config.source).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create MongoDB client");
                eprintln!("Failed to connect to source: {e}");
                return Ok(4);
            }
        };

        let target = match PostgreSQLClient::new(config.target.clone()).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create PostgreSQL client");
                eprintln!("Failed to connect to target: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = source.ping().await {
            tracing::error!(source = %source.connection_string_safe(), error = %e, "Source store unreachable");
            eprintln!("❌ Source store unreachable: {e}");
            return Ok(4);
        }
        if let Err(e) = target.ping().await {
            tracing::error!(target_uri = %target.connection_string_safe(), error = %e, "Target store unreachable");
            eprintln!("❌ Target store unreachable: {e}");
            return Ok(4);
        }

        if self.provision {
            if let Err(e) = target.ensure_schema().await {
                tracing::error!(error = %e, "Schema provisioning failed");
                eprintln!("❌ Schema provisioning failed: {e}");
                return Ok(5);
            }
        }

        let metrics = Arc::new(CounterSink::new());

        println!("🚀 Starting synchronization...");
        println!("  Entities: {:?}", config.sync.entities);
        println!();

        let report = Supervisor::new(
            config.sync.clone(),
            config.source.collections.clone(),
            source,
            target,
            metrics.clone(),
            shutdown_signal,
        )
        .run()
        .await;

        metrics.log_totals();
        tracing::debug!(exposition = %metrics.render_prometheus(), "Final counters");

        println!();
        println!("Synchronization stopped:");
        for pipeline in &report.pipelines {
            println!(
                "  {:<12} passes: {:>4}  succeeded: {:>8}  failed: {:>6}",
                pipeline.entity.as_str(),
                pipeline.passes(),
                pipeline.succeeded,
                pipeline.failed
            );
        }
        if report.timed_out {
            println!("⚠️  Pipelines were aborted after the shutdown timeout");
        }

        if report.interrupted() {
            Ok(130)
        } else {
            Ok(0)
        }
    }
}
