//! Status command implementation
//!
//! Prints the stored checkpoint of every entity, plus configured entities that
//! have never been synced.

use super::{EXIT_CONFIG, EXIT_FATAL};
use crate::config::load_config;
use crate::core::checkpoint::{CheckpointStatus, CheckpointStore, FileCheckpointStore};
use chrono::SecondsFormat;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show only this entity
    #[arg(long)]
    pub entity: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match FileCheckpointStore::open(&config.checkpoint.path).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open checkpoint directory");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let statuses = match store.list().await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to read checkpoints");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let wanted = |name: &str| self.entity.as_deref().map_or(true, |e| e == name);

        println!(
            "{:<20} {:<12} {:<32} {:<38} {:>8}",
            "Entity", "Status", "Watermark", "Last ID", "Saves"
        );
        println!("{}", "-".repeat(114));

        for status in statuses.iter().filter(|s| wanted(s.entity())) {
            match status {
                CheckpointStatus::Valid(record) => println!(
                    "{:<20} {:<12} {:<32} {:<38} {:>8}",
                    record.entity,
                    "✅ Valid",
                    record
                        .watermark_timestamp
                        .to_rfc3339_opts(SecondsFormat::Micros, true),
                    record.watermark_id,
                    record.sequence
                ),
                CheckpointStatus::Corrupt { entity, reason } => {
                    println!("{:<20} {:<12} {}", entity, "❌ Corrupt", reason);
                }
            }
        }

        for entity in config
            .entities
            .iter()
            .filter(|e| wanted(&e.name))
            .filter(|e| !statuses.iter().any(|s| s.entity() == e.name))
        {
            println!("{:<20} {:<12}", entity.name, "⏸️  Never synced");
        }

        println!();
        Ok(0)
    }
}
