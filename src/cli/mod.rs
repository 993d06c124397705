//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for searchsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// searchsync - incremental PostgreSQL to Elasticsearch sync
#[derive(Parser, Debug)]
#[command(name = "searchsync")]
#[command(version, about, long_about = None)]
#[command(author = "Searchsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "searchsync.toml", env = "SEARCHSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SEARCHSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sync pipelines until interrupted
    Run(commands::run::RunArgs),

    /// Show stored checkpoints
    Status(commands::status::StatusArgs),

    /// Delete an entity's checkpoint so it resyncs from the beginning
    Reset(commands::reset::ResetArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
