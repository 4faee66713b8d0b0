//! Row source abstraction traits
//!
//! This module defines the traits that row source adapters must implement
//! to be exported by tabledump.

use crate::domain::ids::{DatabaseName, ExportTarget, TableName};
use crate::domain::{Record, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::BTreeSet;

/// Lazy, finite sequence of rows for one table
///
/// The stream is not restartable; each call to [`SourceConnection::stream`]
/// starts a fresh read.
pub type RowStream = BoxStream<'static, Result<Record>>;

/// Factory for source connections
///
/// One connection is opened per export job, so implementations must be
/// cheap to share across tasks.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Open a new connection to the source
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::DumpError::Connection`] if the source cannot be reached.
    async fn connect(&self) -> Result<Box<dyn SourceConnection>>;

    /// Human-readable description of the source, safe to log
    fn describe(&self) -> String;
}

/// An open connection to a row source
#[async_trait]
pub trait SourceConnection: Send + Sync {
    /// List every database visible to this connection
    async fn list_databases(&self) -> Result<BTreeSet<DatabaseName>>;

    /// List the tables of a database
    async fn list_tables(&self, db: &DatabaseName) -> Result<BTreeSet<TableName>>;

    /// Estimate the number of rows in a table
    ///
    /// The count may be stale relative to concurrent writes.
    async fn count(&self, target: &ExportTarget) -> Result<u64>;

    /// Introspection metadata for a table
    async fn info(&self, target: &ExportTarget) -> Result<serde_json::Value>;

    /// Stream every row of a table in source order
    async fn stream(&self, target: &ExportTarget) -> Result<RowStream>;
}
