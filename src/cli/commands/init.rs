//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "catalog-sync.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Catalog Sync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set CATALOG_SYNC_MONGO_URI and CATALOG_SYNC_PG_URI (or use a .env file)");
                println!("  2. Validate configuration: catalog-sync validate-config");
                println!("  3. Create the schema: catalog-sync provision");
                println!("  4. Start syncing: catalog-sync run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Catalog Sync Configuration File

[application]
log_level = "info"

[source]
connection_string = "${CATALOG_SYNC_MONGO_URI}"
database = "main"

[target]
connection_string = "${CATALOG_SYNC_PG_URI}"
max_connections = 10
ssl_mode = "prefer"

[sync]
entities = ["offer", "product", "shop", "shop_review"]
idle_interval_seconds = 5

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Catalog Sync Configuration File
#
# Continuously mirrors marketplace catalog collections from MongoDB into a
# normalized PostgreSQL schema.
#
# Any value may reference an environment variable as ${NAME}. Every key can
# also be overridden with CATALOG_SYNC_<SECTION>_<KEY>, for example
# CATALOG_SYNC_TARGET_MAX_CONNECTIONS=20.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
log_level = "info"

# ============================================================================
# Source (MongoDB)
# ============================================================================
[source]
# mongodb:// or mongodb+srv:// URI
connection_string = "${CATALOG_SYNC_MONGO_URI}"

# Database holding the catalog collections
database = "main"

# Connect and server selection timeout
connect_timeout_seconds = 10

# Collection read by each pipeline
[source.collections]
offers = "offers"
products = "products"
shops = "shops"
shop_reviews = "shop_reviews"

# ============================================================================
# Target (PostgreSQL)
# ============================================================================
[target]
# postgresql://[user[:password]@][host][:port][/dbname]
connection_string = "${CATALOG_SYNC_PG_URI}"

# Connection pool size (1-100); each pipeline holds at most one connection
max_connections = 10

# Timeout for opening or checking out a connection
connection_timeout_seconds = 30

# Per-transaction statement timeout
statement_timeout_seconds = 60

# TLS mode: disable | prefer | require
ssl_mode = "prefer"

# ============================================================================
# Synchronization
# ============================================================================
[sync]
# Pipelines to run; each entity kind gets its own task
entities = ["offer", "product", "shop", "shop_review"]

# Pause between two passes over the same collection
idle_interval_seconds = 5

# Attempts to resolve a brand or category before the record fails (1-10)
dimension_retry_attempts = 3

# Stop each pipeline after this many passes (omit to run forever)
# max_passes = 1

# Time allowed for pipelines to finish their current record after Ctrl+C
shutdown_timeout_secs = 30

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON log lines to rolling files
local_enabled = true

# Log directory
local_path = "./logs"

# Rotation: daily | hourly
local_rotation = "daily"
"#
        .to_string()
    }
}
