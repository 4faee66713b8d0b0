// Tabledump - Parallel table exporter
// Copyright (c) 2025 Tabledump Contributors
// Licensed under the MIT License

//! # Tabledump - Parallel table exporter
//!
//! Tabledump streams the contents of database tables into per-table JSON or
//! CSV files, exporting many tables at once while reporting a single
//! aggregate progress bar.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** `db` / `db.table` selections into a set of tables
//! - **Streaming** each table through a bounded queue into its own serializer
//! - **Tracking** per-table progress and rendering the slowest table's completion
//! - **Failing safely**: the first error or an interrupt cancels every table,
//!   and every output file is still closed into a valid container
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export pipeline (targets, coordinator, workers, serializers)
//! - [`adapters`] - Row sources (PostgreSQL, in-memory)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabledump::adapters::memory::MemorySource;
//! use tabledump::core::export::{ExportCoordinator, ExportOptions, Shutdown};
//! use tabledump::core::serialize::OutputFormat;
//! use tabledump::domain::{ExportTarget, FieldFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ExportTarget::from_names("test", "users")?;
//!     let source = MemorySource::new().with_table(target.clone(), Vec::new());
//!
//!     let options = ExportOptions::new("./dump", OutputFormat::Json, FieldFilter::all())?;
//!     let coordinator = ExportCoordinator::new(Arc::new(source), options, Shutdown::new());
//!
//!     let summary = coordinator.run(&[target].into_iter().collect()).await?;
//!     summary.verdict()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Output Layout
//!
//! ```text
//! <root>/<db>/<table>.info   one JSON line describing the table
//! <root>/<db>/<table>.json   [ record, record, ... ]
//! <root>/<db>/<table>.csv    header row, then one row per record
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::DumpError`]. Failures of individual
//! tables during an export are collected as
//! [`core::export::ErrorRecord`]s in the summary instead.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
