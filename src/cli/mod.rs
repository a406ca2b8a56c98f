//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Catalog Sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Catalog Sync - MongoDB to PostgreSQL catalog synchronization
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version, about, long_about = None)]
#[command(author = "Catalog Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "catalog-sync.toml", env = "CATALOG_SYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CATALOG_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Continuously synchronize the configured collections
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Create (or recreate) the target schema
    Provision(commands::provision::ProvisionArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
