//! Run command implementation
//!
//! Starts one pipeline per configured entity and blocks until a shutdown
//! signal drains them or every entity has halted.

use super::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL};
use crate::config::load_config;
use crate::core::sync::{SyncCoordinator, SyncSummary, EXIT_OK};
use crate::domain::SyncError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read and transform, but write nothing to the index or checkpoints
    #[arg(long)]
    pub dry_run: bool,

    /// Run only this entity
    #[arg(long)]
    pub entity: Option<String>,
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
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Some(entity) = &self.entity {
            if config.entity(entity).is_none() {
                eprintln!("Entity '{entity}' is not configured");
                return Ok(EXIT_CONFIG);
            }
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - nothing will be written to the index or checkpoints");
            println!();
        }

        let coordinator = match SyncCoordinator::connect(config, shutdown_signal).await {
            Ok(Some(c)) => c.only_entity(self.entity.clone()),
            Ok(None) => {
                println!("Stopped before the source and index became reachable");
                return Ok(EXIT_OK);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize sync");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(match e {
                    SyncError::Configuration(_) | SyncError::FatalConfiguration { .. } => {
                        EXIT_CONFIG
                    }
                    SyncError::Source(_) | SyncError::Index(_) | SyncError::TransientConnection(_) => {
                        EXIT_CONNECTION
                    }
                    _ => EXIT_FATAL,
                });
            }
        };

        println!("🚀 Sync running, press Ctrl+C to stop");
        let summary = match coordinator.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        summary.log_summary();
        print_summary(&summary);
        Ok(summary.exit_code())
    }
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("📊 Sync Summary:");
    println!(
        "  {:<20} {:<10} {:>8} {:>10} {:>8} {:>8}",
        "Entity", "State", "Cycles", "Loaded", "Skipped", "Failed"
    );
    println!("  {}", "-".repeat(70));
    for report in &summary.reports {
        println!(
            "  {:<20} {:<10} {:>8} {:>10} {:>8} {:>8}",
            report.entity,
            report.final_state,
            report.cycles,
            report.documents_loaded,
            report.rows_skipped,
            report.documents_failed
        );
        if let Some(reason) = &report.fatal_reason {
            println!("    ❌ {reason}");
        }
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}
