//! PostgreSQL adapter implementing the row source traits
//!
//! A "database" is a PostgreSQL schema of the configured catalog, and a
//! "table" is one of its base tables.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::queries;
use crate::adapters::source::traits::{RowSource, RowStream, SourceConnection};
use crate::config::SourceConfig;
use crate::domain::ids::{DatabaseName, ExportTarget, TableName};
use crate::domain::{DumpError, Record, Result};
use async_trait::async_trait;
use deadpool_postgres::Object;
use futures::StreamExt;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

/// PostgreSQL implementation of [`RowSource`]
pub struct PostgreSQLSource {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLSource {
    /// Create a new PostgreSQL source from configuration
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(PostgreSQLClient::new(config)?),
        })
    }
}

#[async_trait]
impl RowSource for PostgreSQLSource {
    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        let client = self.client.get_connection().await?;
        tracing::debug!(target_db = %self.client.target(), "Opened source connection");
        Ok(Box::new(PostgreSQLConnection { client }))
    }

    fn describe(&self) -> String {
        format!("postgresql://{}", self.client.target())
    }
}

/// A pooled connection used by one export job
pub struct PostgreSQLConnection {
    client: Object,
}

fn decode_row(row: Row) -> Result<Record> {
    let value: Value = row
        .try_get(0)
        .map_err(|e| DumpError::Source(format!("Failed to decode row: {}", e)))?;
    match value {
        Value::Object(record) => Ok(record),
        other => Err(DumpError::Source(format!(
            "Expected a JSON object row, got: {}",
            other
        ))),
    }
}

#[async_trait]
impl SourceConnection for PostgreSQLConnection {
    async fn list_databases(&self) -> Result<BTreeSet<DatabaseName>> {
        let rows = self.client.query(queries::LIST_SCHEMAS, &[]).await?;

        let mut databases = BTreeSet::new();
        for row in rows {
            let name: String = row.get(0);
            match DatabaseName::new(name.as_str()) {
                Ok(db) => {
                    databases.insert(db);
                }
                Err(e) => tracing::warn!(schema = %name, error = %e, "Skipping schema"),
            }
        }
        Ok(databases)
    }

    async fn list_tables(&self, db: &DatabaseName) -> Result<BTreeSet<TableName>> {
        let rows = self
            .client
            .query(queries::LIST_TABLES, &[&db.as_str()])
            .await?;

        let mut tables = BTreeSet::new();
        for row in rows {
            let name: String = row.get(0);
            match TableName::new(name.as_str()) {
                Ok(table) => {
                    tables.insert(table);
                }
                Err(e) => tracing::warn!(db = %db, table = %name, error = %e, "Skipping table"),
            }
        }
        Ok(tables)
    }

    async fn count(&self, target: &ExportTarget) -> Result<u64> {
        let row = self
            .client
            .query_one(queries::count_rows(target).as_str(), &[])
            .await?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    async fn info(&self, target: &ExportTarget) -> Result<Value> {
        let params: [&(dyn ToSql + Sync); 2] = [&target.db.as_str(), &target.table.as_str()];

        let primary_key = self
            .client
            .query(queries::PRIMARY_KEY_COLUMNS, &params)
            .await?
            .into_iter()
            .map(|row| row.get::<_, String>(0))
            .collect();

        let indexes = self
            .client
            .query(queries::TABLE_INDEXES, &params)
            .await?
            .into_iter()
            .map(|row| row.get::<_, String>(0))
            .collect();

        Ok(queries::table_info(target, primary_key, indexes))
    }

    async fn stream(&self, target: &ExportTarget) -> Result<RowStream> {
        let sql = queries::select_rows(target);
        let rows = self
            .client
            .query_raw(sql.as_str(), std::iter::empty::<&(dyn ToSql + Sync)>())
            .await?;

        Ok(rows
            .map(|row| row.map_err(DumpError::from).and_then(decode_row))
            .boxed())
    }
}
