//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the tabledump configuration file.

use crate::cli::{EXIT_SUCCESS, EXIT_USAGE};
use crate::config::{load_config_or_default, DumpConfig};
use crate::core::serialize::OutputFormat;
use clap::Args;
use std::str::FromStr;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str, explicit: bool) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config_or_default(config_path, explicit) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_USAGE);
            }
        };

        if let Err(e) = OutputFormat::from_str(&config.export.format) {
            println!("Configuration is invalid");
            println!("   Error: {e}");
            return Ok(EXIT_USAGE);
        }

        println!("Configuration is valid");
        println!();
        print_summary(&config);
        Ok(EXIT_SUCCESS)
    }
}

fn print_summary(config: &DumpConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Source: {}", config.source.display_target());
    println!("  Max Connections: {}", config.source.max_connections);
    println!("  Format: {}", config.export.format);
    println!(
        "  Selections: {}",
        if config.export.selections.is_empty() {
            "All".to_string()
        } else {
            config.export.selections.join(", ")
        }
    );
    if let Some(fields) = &config.export.fields {
        println!("  Fields: {}", fields.join(", "));
    }
    println!(
        "  Progress Batch Size: {}",
        config.export.tuning.progress_batch_size
    );
    println!("  Poll Interval: {}ms", config.export.tuning.poll_interval_ms);
    println!("  Queue Capacity: {}", config.export.tuning.queue_capacity);
    println!();
}
