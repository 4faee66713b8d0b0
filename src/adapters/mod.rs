//! Row source integrations for tabledump.
//!
//! This module provides the adapters the export pipeline reads rows from:
//!
//! - [`source`] - Row source abstraction layer (trait-based)
//! - [`postgresql`] - PostgreSQL implementation (schemas as databases)
//! - [`memory`] - In-memory implementation for tests and embedding
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. The pipeline only sees
//! [`source::RowSource`] and [`source::SourceConnection`].
//!
//! ```rust,no_run
//! use tabledump::adapters::source::create_row_source;
//! use tabledump::config::SourceConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = create_row_source(&SourceConfig::default())?;
//! let connection = source.connect().await?;
//! let databases = connection.list_databases().await?;
//! println!("{} databases", databases.len());
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod postgresql;
pub mod source;
