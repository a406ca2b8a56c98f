//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Catalog Sync configuration file.

use crate::config::{load_config, redact_url, SyncConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

fn print_summary(config: &SyncConfig) {
    let source_uri = redact_url(config.source.connection_string.expose_secret().as_ref());
    let target_uri = redact_url(config.target.connection_string.expose_secret().as_ref());

    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Source: {}", source_uri);
    println!("  Source Database: {}", config.source.database);
    for kind in &config.sync.entities {
        println!(
            "    {:<12} <- collection '{}'",
            kind.as_str(),
            config.source.collections.for_kind(*kind)
        );
    }
    println!("  Target: {}", target_uri);
    println!("  Max Connections: {}", config.target.max_connections);
    println!("  SSL Mode: {}", config.target.ssl_mode);
    println!("  Idle Interval: {}s", config.sync.idle_interval_seconds);
    println!(
        "  Dimension Retry Attempts: {}",
        config.sync.dimension_retry_attempts
    );
    println!("  Shutdown Timeout: {}s", config.sync.shutdown_timeout_secs);
    if config.logging.local_enabled {
        println!(
            "  Log Files: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        );
    }
}
