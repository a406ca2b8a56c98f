//! Provision command implementation
//!
//! This module implements the `provision` command, which creates the target
//! tables and indexes, optionally dropping them first.

use crate::adapters::postgresql::PostgreSQLClient;
use crate::adapters::target::TargetStore;
use crate::config::load_config;
use clap::Args;

/// Arguments for the provision command
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Drop every Catalog Sync table before creating the schema
    #[arg(long)]
    pub drop: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ProvisionArgs {
    /// Execute the provision command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(drop = self.drop, "Starting provision command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let client = match PostgreSQLClient::new(config.target.clone()).await {
            Ok(client) => client,
            Err(e) => {
                eprintln!("Failed to connect to target: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = client.ping().await {
            eprintln!("❌ Target store unreachable: {e}");
            return Ok(4);
        }

        println!("🗄️  Provisioning schema on {}", client.connection_string_safe());

        if self.drop {
            if !self.yes && !confirm("Drop all Catalog Sync tables and their data?")? {
                println!("Provisioning cancelled.");
                return Ok(0);
            }

            if let Err(e) = client.drop_schema().await {
                println!("❌ Failed to drop schema");
                println!("   Error: {e}");
                return Ok(5);
            }
            println!("✅ Existing tables dropped");
        }

        match client.ensure_schema().await {
            Ok(()) => {
                println!("✅ Schema is up to date");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to create schema");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    use std::io::{self, Write};

    print!("{question} [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
