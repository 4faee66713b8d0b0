// Tabledump - Parallel table exporter
// Copyright (c) 2025 Tabledump Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use tabledump::cli::{Cli, Commands, EXIT_USAGE};
use tabledump::config::{load_config_or_default, DumpConfig};
use tabledump::core::export::Shutdown;
use tabledump::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // validate-config reports load errors itself
    if let Commands::ValidateConfig(args) = &cli.command {
        let (path, explicit) = cli.config_path();
        let code = match args.execute(path, explicit).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e}");
                EXIT_USAGE
            }
        };
        process::exit(code);
    }

    let (config_path, explicit) = cli.config_path();
    let config = match load_config_or_default(config_path, explicit) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(EXIT_USAGE);
        }
    };

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.application.log_level.clone());
    let logging_guard = match init_logging(&log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_USAGE);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Tabledump - Parallel table exporter"
    );

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let exit_code = match execute_command(&cli, &config, shutdown).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_USAGE
        }
    };

    drop(logging_guard);
    process::exit(exit_code);
}

/// Interrupts the export on SIGINT or SIGTERM
///
/// The handler only flips the shutdown handle; jobs stop on their own and
/// close their output files.
fn spawn_signal_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("Received SIGINT (Ctrl+C), interrupting export");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, interrupting export");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                        return;
                    }
                    tracing::info!("Received SIGINT (Ctrl+C), interrupting export");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Received SIGINT (Ctrl+C), interrupting export");
        }

        shutdown.interrupt();
    });
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, config: &DumpConfig, shutdown: Shutdown) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(config, shutdown).await,
        Commands::ValidateConfig(args) => {
            let (path, explicit) = cli.config_path();
            args.execute(path, explicit).await
        }
    }
}
