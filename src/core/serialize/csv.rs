//! CSV writer
//!
//! The header is the requested field list; each record becomes one row with
//! its cells in field-list order.

use crate::core::serialize::value::FieldValue;
use crate::core::serialize::RecordWriter;
use crate::domain::{DumpError, Record, Result};
use std::io::Write;

/// Writer for the CSV format
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
    fields: Vec<String>,
    written: u64,
}

impl<W: Write> CsvWriter<W> {
    /// Create a writer and emit the header row
    pub fn new(out: W, fields: Vec<String>) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);
        writer.write_record(&fields)?;
        Ok(Self {
            writer,
            fields,
            written: 0,
        })
    }

    /// Consume the writer, returning the underlying output
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| DumpError::Writer(e.error().to_string()))
    }
}

impl<W: Write + Send> RecordWriter for CsvWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        let row: Vec<_> = self
            .fields
            .iter()
            .map(|field| FieldValue::classify(record.get(field)).render())
            .collect();
        self.writer.write_record(row.iter().map(|cell| cell.as_bytes()))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}
