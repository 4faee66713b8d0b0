//! Export target resolution
//!
//! Turns user selections (`db` or `db.table`) into the concrete set of tables
//! to export, checking each one against the source.

use crate::adapters::source::SourceConnection;
use crate::domain::ids::{ExportTarget, Selection};
use crate::domain::{DumpError, Result};
use std::collections::BTreeSet;

/// Resolve selections into a duplicate-free set of export targets
///
/// An empty selection list means every database of the source. Overlapping
/// selections (a database and one of its tables) collapse into one target.
///
/// # Errors
///
/// Returns [`DumpError::NotFound`] for an unknown database or table, or the
/// source error if listing fails.
pub async fn resolve_targets(
    connection: &dyn SourceConnection,
    selections: &[Selection],
) -> Result<BTreeSet<ExportTarget>> {
    let databases = connection.list_databases().await?;

    let selections: Vec<Selection> = if selections.is_empty() {
        databases.iter().cloned().map(Selection::Database).collect()
    } else {
        selections.to_vec()
    };

    let mut targets = BTreeSet::new();
    for selection in &selections {
        let db = selection.database();
        if !databases.contains(db) {
            return Err(DumpError::NotFound(format!("Database '{}' not found", db)));
        }

        let tables = connection.list_tables(db).await?;
        match selection {
            Selection::Database(db) => {
                targets.extend(
                    tables
                        .into_iter()
                        .map(|table| ExportTarget::new(db.clone(), table)),
                );
            }
            Selection::Table(target) => {
                if !tables.contains(&target.table) {
                    return Err(DumpError::NotFound(format!(
                        "Table not found: '{}'",
                        target
                    )));
                }
                targets.insert(target.clone());
            }
        }
    }

    tracing::debug!(
        selections = selections.len(),
        targets = targets.len(),
        "Resolved export targets"
    );

    Ok(targets)
}
