//! Shared fixtures for the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tabledump::adapters::memory::MemorySource;
use tabledump::config::TuningConfig;
use tabledump::core::export::{ExportCoordinator, ExportOptions, Shutdown};
use tabledump::core::serialize::OutputFormat;
use tabledump::domain::{ExportTarget, FieldFilter, Record};

pub fn target(db: &str, table: &str) -> ExportTarget {
    ExportTarget::from_names(db, table).unwrap()
}

pub fn targets(items: &[(&str, &str)]) -> BTreeSet<ExportTarget> {
    items.iter().map(|(db, table)| target(db, table)).collect()
}

/// Rows `{"id": i, "name": "<prefix>-i", "active": i % 2 == 0}`
pub fn rows(prefix: &str, n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            json!({"id": i, "name": format!("{prefix}-{i}"), "active": i % 2 == 0})
                .as_object()
                .cloned()
                .unwrap()
        })
        .collect()
}

pub fn fast_tuning() -> TuningConfig {
    TuningConfig {
        poll_interval_ms: 5,
        ..TuningConfig::default()
    }
}

pub fn coordinator(
    source: MemorySource,
    root: &Path,
    format: OutputFormat,
    filter: FieldFilter,
    shutdown: Shutdown,
) -> ExportCoordinator {
    let options = ExportOptions::new(root, format, filter)
        .unwrap()
        .with_tuning(fast_tuning());
    ExportCoordinator::new(Arc::new(source), options, shutdown)
}

pub fn read_json_array(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}
