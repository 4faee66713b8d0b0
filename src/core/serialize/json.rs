//! JSON array writer
//!
//! Output is `[`, then each record on its own line separated by `,`, then
//! `\n]\n`. An export with no rows is `[\n]\n`.

use crate::core::serialize::RecordWriter;
use crate::domain::{Record, Result};
use std::io::Write;

/// Writer for the JSON array format
pub struct JsonWriter<W: Write> {
    out: W,
    first: bool,
    written: u64,
}

impl<W: Write> JsonWriter<W> {
    /// Create a writer and emit the opening bracket
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(b"[")?;
        Ok(Self {
            out,
            first: true,
            written: 0,
        })
    }

    /// Consume the writer, returning the underlying output
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RecordWriter for JsonWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.first {
            self.first = false;
            self.out.write_all(b"\n")?;
        } else {
            self.out.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.out, record)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.write_all(b"\n]\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}
