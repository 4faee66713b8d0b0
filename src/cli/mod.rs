//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for tabledump using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "tabledump.toml";

/// Exit code of a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when one or more tables reported errors
pub const EXIT_JOB_ERRORS: i32 = 1;
/// Exit code for usage, configuration and format errors
pub const EXIT_USAGE: i32 = 2;
/// Exit code when the source cannot be reached or a selection does not exist
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code after an interrupt (SIGINT convention)
pub const EXIT_INTERRUPTED: i32 = 130;

/// tabledump - parallel table exporter
#[derive(Parser, Debug)]
#[command(name = "tabledump")]
#[command(version, about, long_about = None)]
#[command(author = "Tabledump Contributors")]
pub struct Cli {
    /// Path to configuration file [default: tabledump.toml]
    #[arg(long, env = "TABLEDUMP_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TABLEDUMP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration path, and whether it was requested explicitly
    pub fn config_path(&self) -> (&str, bool) {
        match &self.config {
            Some(path) => (path.as_str(), true),
            None => (DEFAULT_CONFIG_PATH, false),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export tables to JSON or CSV files
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
