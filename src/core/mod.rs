//! Core business logic for tabledump.
//!
//! This module contains the export pipeline and its orchestration.
//!
//! # Modules
//!
//! - [`targets`] - Resolving `db` / `db.table` selections into tables
//! - [`export`] - Export coordination, per-table workers, progress and errors
//! - [`serialize`] - JSON and CSV output writers
//!
//! # Export Workflow
//!
//! 1. **Resolve**: Turn selections into a set of tables
//! 2. **Prepare**: Create one output directory per database
//! 3. **Launch**: Start one worker and one serializer per table
//! 4. **Poll**: Drain errors, reap finished jobs, render progress
//! 5. **Report**: Return the export summary and its verdict
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabledump::adapters::source::{create_row_source, RowSource};
//! use tabledump::config::SourceConfig;
//! use tabledump::core::export::{ExportCoordinator, ExportOptions, Shutdown};
//! use tabledump::core::serialize::OutputFormat;
//! use tabledump::core::targets::resolve_targets;
//! use tabledump::domain::FieldFilter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = create_row_source(&SourceConfig::default())?;
//! let connection = source.connect().await?;
//! let targets = resolve_targets(connection.as_ref(), &[]).await?;
//!
//! let options = ExportOptions::new("./dump", OutputFormat::Json, FieldFilter::all())?;
//! let coordinator = ExportCoordinator::new(Arc::clone(&source), options, Shutdown::new());
//! let summary = coordinator.run(&targets).await?;
//!
//! println!("Rows: {}", summary.rows_exported);
//! summary.verdict()?;
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod serialize;
pub mod targets;
