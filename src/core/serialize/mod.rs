//! Output serializers
//!
//! A serializer owns one output file. It opens the file before accepting any
//! rows, writes every [`QueueItem::Row`] it receives through the format's
//! framing, and closes the container when it receives [`QueueItem::Done`].
//!
//! Serializers run on blocking threads and read their queue with
//! [`tokio::sync::mpsc::Receiver::blocking_recv`].

pub mod csv;
pub mod json;
pub mod value;

pub use self::csv::CsvWriter;
pub use self::json::JsonWriter;
pub use self::value::FieldValue;

use crate::domain::ids::ExportTarget;
use crate::domain::{DumpError, FieldFilter, Record, Result};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::mpsc;

/// Item passed from an export worker to its serializer
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    /// One row, in source order
    Row(Record),
    /// No more rows: finalize the container and stop
    Done,
}

/// Format-specific record writer
pub trait RecordWriter: Send {
    /// Write one (already projected) record
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Write the closing framing and flush
    fn finish(&mut self) -> Result<()>;

    /// Number of records written so far
    fn records_written(&self) -> u64;
}

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON array, one record per line
    #[default]
    Json,
    /// CSV with a header row; requires a field list
    Csv,
}

impl OutputFormat {
    /// File extension of the data file
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// Check that a field filter is usable with this format
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Format`] for CSV without a field list.
    pub fn check_fields(&self, filter: &FieldFilter) -> Result<()> {
        match (self, filter.fields()) {
            (OutputFormat::Csv, None) => Err(DumpError::Format(
                "Cannot write a CSV with no fields selected. The '--fields' option must be specified."
                    .to_string(),
            )),
            (OutputFormat::Csv, Some([])) => Err(DumpError::Format(
                "Cannot write a CSV with an empty field list".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(DumpError::Format(format!(
                "Unknown format '{}', valid options are 'csv' and 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `<root>/<db>/<table>.<extension>`
pub fn table_path(root: &Path, target: &ExportTarget, extension: &str) -> PathBuf {
    root.join(target.db.as_str())
        .join(format!("{}.{}", target.table, extension))
}

/// Create the output file and its format writer
///
/// # Errors
///
/// Returns an error if the file cannot be created or the format's header
/// cannot be written.
pub fn create_writer(
    format: OutputFormat,
    path: &Path,
    filter: &FieldFilter,
) -> Result<Box<dyn RecordWriter>> {
    format.check_fields(filter)?;
    let out = BufWriter::new(File::create(path).map_err(|e| {
        DumpError::Writer(format!("Failed to create {}: {}", path.display(), e))
    })?);

    match format {
        OutputFormat::Json => Ok(Box::new(JsonWriter::new(out)?)),
        OutputFormat::Csv => {
            let fields = filter.fields().map(<[String]>::to_vec).unwrap_or_default();
            Ok(Box::new(CsvWriter::new(out, fields)?))
        }
    }
}

/// Drain a row queue into a writer until the end marker
///
/// Must run on a blocking thread. A queue closed without [`QueueItem::Done`]
/// is treated as the end of input. Returns the number of records written.
///
/// # Errors
///
/// Returns the first write error; the container is left unfinished.
pub fn serialize(
    rx: &mut mpsc::Receiver<QueueItem>,
    writer: &mut dyn RecordWriter,
    filter: &FieldFilter,
) -> Result<u64> {
    loop {
        match rx.blocking_recv() {
            Some(QueueItem::Row(record)) => writer.write_record(&filter.project(record))?,
            Some(QueueItem::Done) => break,
            None => {
                tracing::warn!("Row queue closed without end marker");
                break;
            }
        }
    }
    writer.finish()?;
    Ok(writer.records_written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn row(value: Value) -> QueueItem {
        QueueItem::Row(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, DumpError::Format(_)));
        assert_eq!(err.kind(), crate::domain::ErrorKind::Format);
    }

    #[test]
    fn test_csv_requires_fields() {
        assert!(OutputFormat::Csv.check_fields(&FieldFilter::all()).is_err());
        assert!(OutputFormat::Csv.check_fields(&FieldFilter::only(Vec::<String>::new())).is_err());
        assert!(OutputFormat::Csv.check_fields(&FieldFilter::parse("id")).is_ok());
        assert!(OutputFormat::Json.check_fields(&FieldFilter::all()).is_ok());
    }

    #[test]
    fn test_table_path() {
        let target = ExportTarget::from_names("test", "users").unwrap();
        let path = table_path(Path::new("/out"), &target, "info");
        assert_eq!(path, PathBuf::from("/out/test/users.info"));
    }

    #[test]
    fn test_serialize_projects_and_finalizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        let filter = FieldFilter::parse("id");

        let (tx, mut rx) = mpsc::channel(8);
        tx.try_send(row(json!({"id": 1, "secret": "x"}))).unwrap();
        tx.try_send(row(json!({"id": 2}))).unwrap();
        tx.try_send(QueueItem::Done).unwrap();
        // Items after the end marker are never read
        tx.try_send(row(json!({"id": 3}))).unwrap();

        let mut writer = create_writer(OutputFormat::Json, &path, &filter).unwrap();
        let written = serialize(&mut rx, writer.as_mut(), &filter).unwrap();
        assert_eq!(written, 2);

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_serialize_closed_queue_still_finalizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        let filter = FieldFilter::parse("id,flag");

        let (tx, mut rx) = mpsc::channel(8);
        tx.try_send(row(json!({"id": 1, "flag": false}))).unwrap();
        drop(tx);

        let mut writer = create_writer(OutputFormat::Csv, &path, &filter).unwrap();
        serialize(&mut rx, writer.as_mut(), &filter).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,flag\n1,false\n");
    }

    #[test]
    fn test_create_writer_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("t.json");
        let result = create_writer(OutputFormat::Json, &path, &FieldFilter::all());
        assert!(matches!(result, Err(DumpError::Writer(_))));
    }
}
