//! Reset command implementation
//!
//! Deletes an entity's checkpoint. The next run resyncs that entity from the
//! beginning; external versioning keeps the replay from overwriting newer
//! documents.

use super::{EXIT_CONFIG, EXIT_FATAL};
use crate::config::load_config;
use crate::core::checkpoint::{CheckpointStore, FileCheckpointStore};
use crate::domain::ids::EntityName;
use clap::Args;

/// Arguments for the reset command
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Entity whose checkpoint is deleted
    #[arg(long)]
    pub entity: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ResetArgs {
    /// Execute the reset command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let entity = match EntityName::new(self.entity.as_str()) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Invalid entity name: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if config.entity(entity.as_str()).is_none() {
            println!("⚠️  Entity '{entity}' is not in the configuration");
        }

        if !self.yes {
            print!("Reset checkpoint for '{entity}'? The entity will resync from the beginning. [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Reset cancelled.");
                return Ok(0);
            }
        }

        let store = match FileCheckpointStore::open(&config.checkpoint.path).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open checkpoint directory");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        match store.reset(&entity).await {
            Ok(true) => {
                tracing::info!(entity = %entity, "Checkpoint reset");
                println!("✅ Checkpoint for '{entity}' deleted");
                Ok(0)
            }
            Ok(false) => {
                println!("No checkpoint stored for '{entity}'");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to reset checkpoint");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}
