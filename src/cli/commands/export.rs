//! Export command implementation
//!
//! This module implements the `export` command: it turns the command line
//! and configuration into an export plan, resolves the tables to export,
//! runs the coordinator and maps the outcome to an exit code.

use crate::adapters::source::{create_row_source, RowSource};
use crate::cli::{EXIT_CONNECTION, EXIT_INTERRUPTED, EXIT_JOB_ERRORS, EXIT_SUCCESS, EXIT_USAGE};
use crate::config::{secret_string, DumpConfig, SourceConfig};
use crate::core::export::{ExportCoordinator, ExportOptions, ExportSummary, Shutdown};
use crate::core::serialize::OutputFormat;
use crate::core::targets::resolve_targets;
use crate::domain::ids::Selection;
use crate::domain::{DumpError, FieldFilter, Result};
use crate::log_error_with_context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Host and client port of the source to connect to
    #[arg(short = 'c', long = "connect", value_name = "HOST:PORT")]
    pub connect: Option<String>,

    /// Authorization key for the source
    #[arg(
        short = 'a',
        long = "auth",
        value_name = "AUTH_KEY",
        env = "TABLEDUMP_AUTH_KEY",
        hide_env_values = true
    )]
    pub auth_key: Option<String>,

    /// Directory to output to [default: ./tabledump_export_<timestamp>]
    #[arg(short = 'd', long = "directory", value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Limit the export to a database or a table (repeatable)
    #[arg(short = 'e', long = "export", value_name = "DB|DB.TABLE")]
    pub export: Vec<String>,

    /// Format to write (json or csv) [default: json]
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Limit the exported fields (required for csv, single table only)
    #[arg(long, value_name = "FIELD,FIELD...")]
    pub fields: Option<String>,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Everything the export needs, resolved from arguments and configuration
#[derive(Debug)]
pub struct ExportPlan {
    /// Source connection settings
    pub source: SourceConfig,

    /// What to export
    pub selections: Vec<Selection>,

    /// Where and how to write
    pub options: ExportOptions,
}

fn default_directory() -> PathBuf {
    PathBuf::from(format!(
        "./tabledump_export_{}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S")
    ))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

impl ExportArgs {
    /// Combine the arguments with the configuration
    ///
    /// Command-line values win over the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Format`] for an unknown format or CSV without
    /// fields, and [`DumpError::Configuration`] for any other invalid option.
    pub fn plan(&self, config: &DumpConfig) -> Result<ExportPlan> {
        let mut source = config.source.clone();
        if let Some(connect) = &self.connect {
            source
                .apply_host_port(connect)
                .map_err(DumpError::Configuration)?;
        }
        if let Some(auth_key) = &self.auth_key {
            source.password = Some(secret_string(auth_key.clone()));
        }

        let format = OutputFormat::from_str(self.format.as_deref().unwrap_or(&config.export.format))?;

        let directory = self
            .directory
            .clone()
            .or_else(|| config.export.directory.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_directory);
        let root = absolute(&directory)?;
        if root.exists() {
            return Err(DumpError::Configuration(format!(
                "Output directory already exists: {}",
                root.display()
            )));
        }

        let raw_selections = if self.export.is_empty() {
            &config.export.selections
        } else {
            &self.export
        };
        let selections = raw_selections
            .iter()
            .map(|s| Selection::from_str(s).map_err(DumpError::Configuration))
            .collect::<Result<Vec<_>>>()?;

        let filter = match (&self.fields, &config.export.fields) {
            (Some(list), _) => FieldFilter::parse(list),
            (None, Some(fields)) => FieldFilter::only(fields.iter().map(|f| f.trim().to_string())),
            (None, None) => FieldFilter::all(),
        };
        format.check_fields(&filter)?;
        if filter.is_restricted() && !matches!(selections.as_slice(), [Selection::Table(_)]) {
            return Err(DumpError::Configuration(
                "Can only use the --fields option when exporting a single table".to_string(),
            ));
        }

        let options = ExportOptions::new(root, format, filter)?
            .with_tuning(config.export.tuning.clone())
            .with_progress(!self.no_progress);

        Ok(ExportPlan {
            source,
            selections,
            options,
        })
    }

    /// Execute the export command
    pub async fn execute(&self, config: &DumpConfig, shutdown: Shutdown) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let plan = match self.plan(config) {
            Ok(plan) => plan,
            Err(e) => {
                log_error_with_context!(&e, "Invalid export options");
                eprintln!("{e}");
                return Ok(EXIT_USAGE);
            }
        };

        let source = match create_row_source(&plan.source) {
            Ok(source) => source,
            Err(e) => {
                log_error_with_context!(&e, "Failed to create row source");
                eprintln!("{e}");
                return Ok(EXIT_USAGE);
            }
        };

        let targets = {
            let resolved = match source.connect().await {
                Ok(connection) => resolve_targets(connection.as_ref(), &plan.selections).await,
                Err(e) => Err(e),
            };
            match resolved {
                Ok(targets) => targets,
                Err(e) => {
                    log_error_with_context!(&e, "Failed to resolve export targets");
                    eprintln!("{e}");
                    return Ok(EXIT_CONNECTION);
                }
            }
        };

        let coordinator = ExportCoordinator::new(source, plan.options, shutdown);
        let summary = match coordinator.run(&targets).await {
            Ok(summary) => summary,
            Err(e) => {
                log_error_with_context!(&e, "Export could not start");
                eprintln!("{e}");
                return Ok(EXIT_USAGE);
            }
        };

        Ok(report(&summary))
    }
}

/// Print the outcome of an export and return its exit code
pub fn report(summary: &ExportSummary) -> i32 {
    for error in &summary.errors {
        eprintln!("{error}");
    }

    match summary.verdict() {
        Ok(()) => {
            println!("  Done ({} seconds)", summary.duration.as_secs());
            EXIT_SUCCESS
        }
        Err(DumpError::Interrupted) => {
            tracing::info!("Export interrupted by user signal");
            eprintln!("Interrupted");
            EXIT_INTERRUPTED
        }
        Err(e) => {
            eprintln!("{e}");
            EXIT_JOB_ERRORS
        }
    }
}
