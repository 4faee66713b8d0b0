//! SQL used by the PostgreSQL row source

use crate::domain::ids::ExportTarget;
use serde_json::{json, Value};

/// Schemas visible to the connected user, minus the system schemas
pub const LIST_SCHEMAS: &str = "SELECT schema_name FROM information_schema.schemata \
     WHERE schema_name <> 'information_schema' AND schema_name NOT LIKE 'pg\\_%' \
     ORDER BY schema_name";

/// Base tables of one schema
pub const LIST_TABLES: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

/// Primary key columns of one table, in key order
pub const PRIMARY_KEY_COLUMNS: &str = "SELECT kcu.column_name \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name \
      AND tc.table_schema = kcu.table_schema \
      AND tc.table_name = kcu.table_name \
     WHERE tc.constraint_type = 'PRIMARY KEY' \
       AND tc.table_schema = $1 AND tc.table_name = $2 \
     ORDER BY kcu.ordinal_position";

/// Secondary index names of one table
pub const TABLE_INDEXES: &str = "SELECT i.indexname FROM pg_indexes i \
     WHERE i.schemaname = $1 AND i.tablename = $2 \
       AND NOT EXISTS ( \
         SELECT 1 FROM pg_constraint c \
         WHERE c.conname = i.indexname AND c.contype = 'p' \
           AND c.connamespace = (SELECT oid FROM pg_namespace WHERE nspname = $1)) \
     ORDER BY i.indexname";

/// Quotes an identifier for interpolation into SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"` for a target
pub fn qualified_name(target: &ExportTarget) -> String {
    format!(
        "{}.{}",
        quote_ident(target.db.as_str()),
        quote_ident(target.table.as_str())
    )
}

/// Exact row count of a table
///
/// Scans the table; `pg_class.reltuples` is cheaper but unreliable before
/// the first `ANALYZE`.
pub fn count_rows(target: &ExportTarget) -> String {
    format!("SELECT count(*) FROM {}", qualified_name(target))
}

/// Every row of a table as a JSON object, in physical order
///
/// `row_to_json` renders timestamps as their raw ISO text rather than a
/// localized representation.
pub fn select_rows(target: &ExportTarget) -> String {
    format!(
        "SELECT row_to_json(t) FROM {} AS t",
        qualified_name(target)
    )
}

/// Builds the `.info` document for a table
///
/// A single-column key is rendered as a string, a composite key as an array,
/// and a table without a key as `null`.
pub fn table_info(target: &ExportTarget, primary_key: Vec<String>, indexes: Vec<String>) -> Value {
    let primary_key = match primary_key.len() {
        0 => Value::Null,
        1 => Value::String(primary_key.into_iter().next().unwrap_or_default()),
        _ => json!(primary_key),
    };

    json!({
        "type": "TABLE",
        "name": target.table.as_str(),
        "db": {
            "type": "DB",
            "name": target.db.as_str(),
        },
        "primary_key": primary_key,
        "indexes": indexes,
    })
}
