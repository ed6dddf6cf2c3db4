//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for mlmigrate using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// mlmigrate - copy and export ML tracking metadata between servers
#[derive(Parser, Debug)]
#[command(name = "mlmigrate")]
#[command(version, about, long_about = None)]
#[command(author = "mlmigrate Contributors")]
pub struct Cli {
    /// Path to configuration file (optional; defaults apply when missing)
    #[arg(short, long, default_value = "mlmigrate.toml", env = "MLMIGRATE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MLMIGRATE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export an experiment and its runs to manifest files
    ExportExperiment(commands::export_experiment::ExportExperimentArgs),

    /// Copy a registered model version to another registry
    CopyModelVersion(commands::copy_model_version::CopyModelVersionArgs),

    /// Make a raw authenticated call against a tracking server
    Http(commands::http::HttpArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
