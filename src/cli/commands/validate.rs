//! Validate config command implementation
//!
//! Loads and validates the configuration file, then checks every entity kind.
//! Unknown kinds pass [`SearchSyncConfig::validate`] because they only halt
//! their own pipeline at run time, but this command reports them as errors.
//!
//! [`SearchSyncConfig::validate`]: crate::config::SearchSyncConfig::validate

use super::EXIT_CONFIG;
use crate::adapters::postgresql::redact_connection_string;
use crate::config::load_config;
use crate::domain::entity::EntityKind;
use clap::Args;
use secrecy::ExposeSecret;
use std::str::FromStr;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded and validated");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source: {}",
            redact_connection_string(config.source.connection_string.expose_secret().as_ref())
        );
        println!("  Source Schema: {}", config.source.schema);
        println!("  Index: {}", config.index.url);
        println!("  Page Size: {}", config.sync.page_size);
        println!("  Retry Attempts: {}", config.sync.retry.max_attempts);
        println!("  Checkpoints: {}", config.checkpoint.path);
        println!("  Dead Letters: {}", config.checkpoint.dead_letter);
        println!();
        println!("Entities:");

        let mut unknown = 0;
        for entity in &config.entities {
            match EntityKind::from_str(&entity.kind) {
                Ok(kind) => println!(
                    "  ✅ {} ({}) -> index '{}', page size {}",
                    entity.name,
                    kind,
                    entity.index_name(),
                    entity.effective_page_size(&config.sync)
                ),
                Err(e) => {
                    unknown += 1;
                    println!("  ❌ {}: {}", entity.name, e);
                }
            }
        }
        println!();

        if unknown > 0 {
            println!("❌ {unknown} entity kind(s) not recognized");
            return Ok(EXIT_CONFIG);
        }

        println!("✅ Configuration is valid");
        Ok(0)
    }
}
