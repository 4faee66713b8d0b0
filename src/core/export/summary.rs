//! Export summary and error reporting
//!
//! This module defines the records jobs report failures with, the channel
//! they travel on, and the summary the coordinator returns.

use crate::domain::ids::ExportTarget;
use crate::domain::{DumpError, ErrorKind, Result};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// A failure reported by an export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Classification of the failure
    pub kind: ErrorKind,

    /// Error message
    pub message: String,

    /// Optional context (e.g. the table being exported)
    pub context: Option<String>,
}

impl ErrorRecord {
    /// Create a new error record
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Build a record from a library error, keeping its classification
    pub fn from_error(error: &DumpError) -> Self {
        Self::new(error.kind(), error.to_string())
    }

    /// Add context to the record
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  while exporting {}", context)?;
        }
        Ok(())
    }
}

/// Sending half of the error channel, cloned into every job
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    tx: mpsc::UnboundedSender<ErrorRecord>,
}

impl ErrorChannel {
    /// Report a failure
    ///
    /// Never blocks. A record sent after the coordinator stopped listening is
    /// only logged.
    pub fn report(&self, record: ErrorRecord) {
        tracing::error!(
            kind = %record.kind,
            message = %record.message,
            context = record.context.as_deref().unwrap_or(""),
            "Export job reported an error"
        );
        if self.tx.send(record).is_err() {
            tracing::debug!("Error channel closed, record dropped");
        }
    }

    /// Report a library error for a table
    pub fn report_error(&self, target: &ExportTarget, error: &DumpError) {
        self.report(ErrorRecord::from_error(error).with_context(target.to_string()));
    }
}

/// Receiving half of the error channel, owned by the coordinator
#[derive(Debug)]
pub struct ErrorReceiver {
    rx: mpsc::UnboundedReceiver<ErrorRecord>,
}

impl ErrorReceiver {
    /// Take every record currently queued, without waiting
    pub fn drain(&mut self) -> Vec<ErrorRecord> {
        let mut records = Vec::new();
        while let Ok(record) = self.rx.try_recv() {
            records.push(record);
        }
        records
    }
}

/// Create a new error channel
pub fn error_channel() -> (ErrorChannel, ErrorReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorChannel { tx }, ErrorReceiver { rx })
}

/// Final counters of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Table exported
    pub target: ExportTarget,

    /// Rows read from the source, or -1 if the job never started
    pub rows_done: i64,

    /// Row count reported by the source
    pub rows_total: i64,
}

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Number of tables launched
    pub total_tables: usize,

    /// Rows read across all tables
    pub rows_exported: u64,

    /// Duration of the export
    pub duration: Duration,

    /// Errors reported, in arrival order
    pub errors: Vec<ErrorRecord>,

    /// Whether an external interrupt was received
    pub interrupted: bool,

    /// Aggregate progress at the end of the run (0.0 to 1.0)
    pub final_progress: f64,

    /// Per-table counters
    pub tables: Vec<TableReport>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            total_tables: 0,
            rows_exported: 0,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            interrupted: false,
            final_progress: 0.0,
            tables: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ErrorRecord) {
        self.errors.push(error);
    }

    /// Check if the export was successful
    pub fn is_successful(&self) -> bool {
        !self.interrupted && self.errors.is_empty()
    }

    /// Overall outcome of the run
    ///
    /// An interrupt wins over any job errors.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Interrupted`] or [`DumpError::JobErrors`].
    pub fn verdict(&self) -> Result<()> {
        if self.interrupted {
            Err(DumpError::Interrupted)
        } else if !self.errors.is_empty() {
            Err(DumpError::JobErrors(self.errors.len()))
        } else {
            Ok(())
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_tables = self.total_tables,
            rows_exported = self.rows_exported,
            duration_secs = self.duration.as_secs(),
            progress = format!("{:.0}%", self.final_progress * 100.0),
            interrupted = self.interrupted,
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new();

        assert_eq!(summary.total_tables, 0);
        assert_eq!(summary.rows_exported, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
        assert!(summary.is_successful());
        assert!(summary.verdict().is_ok());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new().with_duration(Duration::from_secs(120));

        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_verdict_counts_errors() {
        let mut summary = ExportSummary::new();
        summary.add_error(ErrorRecord::new(ErrorKind::Connection, "refused"));
        summary.add_error(ErrorRecord::new(ErrorKind::WriterCrash, "writer unexpectedly stopped"));

        assert!(!summary.is_successful());
        assert!(matches!(summary.verdict(), Err(DumpError::JobErrors(2))));
    }

    #[test]
    fn test_interrupt_wins_verdict() {
        let mut summary = ExportSummary::new();
        summary.add_error(ErrorRecord::new(ErrorKind::Unexpected, "boom"));
        summary.interrupted = true;

        assert!(matches!(summary.verdict(), Err(DumpError::Interrupted)));
    }

    #[test]
    fn test_error_record_from_error() {
        let target = ExportTarget::from_names("test", "users").unwrap();
        let record = ErrorRecord::from_error(&DumpError::NotFound(
            "Table not found: 'test.users'".to_string(),
        ))
        .with_context(target.to_string());

        assert_eq!(record.kind, ErrorKind::NotFound);
        assert_eq!(
            record.to_string(),
            "NotFoundError: Table not found: 'test.users'\n  while exporting test.users"
        );
    }

    #[tokio::test]
    async fn test_error_channel_drains_in_order() {
        let (channel, mut receiver) = error_channel();
        let clone = channel.clone();

        channel.report(ErrorRecord::new(ErrorKind::Connection, "first"));
        clone.report(ErrorRecord::new(ErrorKind::Unexpected, "second"));

        let drained = receiver.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].message, "second");
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn test_report_after_receiver_dropped() {
        let (channel, receiver) = error_channel();
        drop(receiver);
        channel.report(ErrorRecord::new(ErrorKind::Unexpected, "late"));
    }
}
