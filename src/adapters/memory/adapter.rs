//! In-memory row source
//!
//! Serves tables held in process memory. Used by the integration tests and
//! for embedding tabledump where rows are already at hand. Failures and slow
//! streams can be injected per source or per table.

use crate::adapters::source::traits::{RowSource, RowStream, SourceConnection};
use crate::domain::ids::{DatabaseName, ExportTarget, TableName};
use crate::domain::{DumpError, Record, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One table held by a [`MemorySource`]
#[derive(Debug, Clone, Default)]
struct MemoryTable {
    rows: Vec<Record>,
    /// Count reported instead of `rows.len()`, to model a stale estimate
    reported_count: Option<u64>,
    /// Fail the stream after this many rows
    fail_after: Option<(usize, String)>,
}

#[derive(Debug, Clone, Default)]
struct MemoryData {
    databases: BTreeMap<DatabaseName, BTreeMap<TableName, MemoryTable>>,
    connect_error: Option<String>,
    row_delay: Option<Duration>,
}

/// In-memory implementation of [`RowSource`]
///
/// # Examples
///
/// ```
/// use tabledump::adapters::memory::MemorySource;
/// use tabledump::domain::ExportTarget;
/// use serde_json::json;
///
/// let target = ExportTarget::from_names("test", "users").unwrap();
/// let row = json!({"id": 1}).as_object().cloned().unwrap();
/// let source = MemorySource::new().with_table(target, vec![row]);
/// assert_eq!(source.row_count(&ExportTarget::from_names("test", "users").unwrap()), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Arc<MemoryData>,
    connections: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    fn data_mut(&mut self) -> &mut MemoryData {
        Arc::make_mut(&mut self.data)
    }

    fn table_mut(&mut self, target: ExportTarget) -> &mut MemoryTable {
        self.data_mut()
            .databases
            .entry(target.db)
            .or_default()
            .entry(target.table)
            .or_default()
    }

    /// Add a database without tables
    pub fn with_database(mut self, db: DatabaseName) -> Self {
        self.data_mut().databases.entry(db).or_default();
        self
    }

    /// Add (or replace the rows of) a table
    pub fn with_table(mut self, target: ExportTarget, rows: Vec<Record>) -> Self {
        self.table_mut(target).rows = rows;
        self
    }

    /// Report `count` as the table's row count regardless of its contents
    pub fn with_reported_count(mut self, target: ExportTarget, count: u64) -> Self {
        self.table_mut(target).reported_count = Some(count);
        self
    }

    /// Make the table's stream yield an error after `rows` rows
    pub fn with_stream_failure(
        mut self,
        target: ExportTarget,
        rows: usize,
        message: impl Into<String>,
    ) -> Self {
        self.table_mut(target).fail_after = Some((rows, message.into()));
        self
    }

    /// Make every connection attempt fail
    pub fn with_connect_failure(mut self, message: impl Into<String>) -> Self {
        self.data_mut().connect_error = Some(message.into());
        self
    }

    /// Sleep before yielding each row
    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.data_mut().row_delay = Some(delay);
        self
    }

    /// Number of rows stored for a table
    pub fn row_count(&self, target: &ExportTarget) -> Option<usize> {
        self.lookup(target).map(|table| table.rows.len())
    }

    /// Number of connections opened so far
    pub fn connections_opened(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    fn lookup(&self, target: &ExportTarget) -> Option<&MemoryTable> {
        self.data
            .databases
            .get(&target.db)
            .and_then(|tables| tables.get(&target.table))
    }
}

#[async_trait]
impl RowSource for MemorySource {
    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        if let Some(message) = &self.data.connect_error {
            return Err(DumpError::Connection(message.clone()));
        }
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            data: Arc::clone(&self.data),
        }))
    }

    fn describe(&self) -> String {
        format!("memory://{}-databases", self.data.databases.len())
    }
}

/// Connection to a [`MemorySource`]
pub struct MemoryConnection {
    data: Arc<MemoryData>,
}

impl MemoryConnection {
    fn table(&self, target: &ExportTarget) -> Result<&MemoryTable> {
        self.data
            .databases
            .get(&target.db)
            .and_then(|tables| tables.get(&target.table))
            .ok_or_else(|| DumpError::NotFound(format!("Table not found: '{}'", target)))
    }
}

#[async_trait]
impl SourceConnection for MemoryConnection {
    async fn list_databases(&self) -> Result<BTreeSet<DatabaseName>> {
        Ok(self.data.databases.keys().cloned().collect())
    }

    async fn list_tables(&self, db: &DatabaseName) -> Result<BTreeSet<TableName>> {
        self.data
            .databases
            .get(db)
            .map(|tables| tables.keys().cloned().collect())
            .ok_or_else(|| DumpError::NotFound(format!("Database '{}' not found", db)))
    }

    async fn count(&self, target: &ExportTarget) -> Result<u64> {
        let table = self.table(target)?;
        Ok(table.reported_count.unwrap_or(table.rows.len() as u64))
    }

    async fn info(&self, target: &ExportTarget) -> Result<Value> {
        self.table(target)?;
        Ok(json!({
            "type": "TABLE",
            "name": target.table.as_str(),
            "db": {
                "type": "DB",
                "name": target.db.as_str(),
            },
            "primary_key": "id",
            "indexes": [],
        }))
    }

    async fn stream(&self, target: &ExportTarget) -> Result<RowStream> {
        let table = self.table(target)?;

        let mut items: Vec<Result<Record>> = match &table.fail_after {
            Some((limit, _)) => table.rows.iter().take(*limit).cloned().map(Ok).collect(),
            None => table.rows.iter().cloned().map(Ok).collect(),
        };
        if let Some((_, message)) = &table.fail_after {
            items.push(Err(DumpError::Source(message.clone())));
        }

        let rows = futures::stream::iter(items);
        Ok(match self.data.row_delay {
            Some(delay) => rows
                .then(move |item| async move {
                    tokio::time::sleep(delay).await;
                    item
                })
                .boxed(),
            None => rows.boxed(),
        })
    }
}
