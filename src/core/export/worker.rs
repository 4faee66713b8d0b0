//! Per-table export worker
//!
//! An [`ExportJob`] reads one table from the row source and feeds its rows,
//! in order, through a bounded queue to the table's serializer, which runs on
//! a blocking thread. Every failure is reported on the error channel; the
//! job itself never returns an error.

use crate::adapters::source::{RowSource, SourceConnection};
use crate::core::export::progress::{ProgressBatcher, ProgressCounter};
use crate::core::export::shutdown::Shutdown;
use crate::core::export::summary::{ErrorChannel, ErrorRecord};
use crate::core::serialize::{create_writer, serialize, table_path, OutputFormat, QueueItem};
use crate::domain::ids::ExportTarget;
use crate::domain::{ErrorKind, FieldFilter, Result};
use crate::{log_table_complete, log_table_start};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Message reported when a serializer stops before the end marker
pub const WRITER_STOPPED: &str = "writer unexpectedly stopped";

/// Settings shared by every job of a run
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Output root directory
    pub root: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Fields to keep
    pub filter: FieldFilter,

    /// Rows read between progress counter updates
    pub progress_batch_size: u64,

    /// Capacity of the row queue
    pub queue_capacity: usize,
}

/// Runtime state of one table export
pub struct ExportJob {
    target: ExportTarget,
    settings: Arc<JobSettings>,
    source: Arc<dyn RowSource>,
    progress: Arc<ProgressCounter>,
    errors: ErrorChannel,
    shutdown: Shutdown,
}

impl ExportJob {
    /// Create a job for one table
    pub fn new(
        target: ExportTarget,
        settings: Arc<JobSettings>,
        source: Arc<dyn RowSource>,
        progress: Arc<ProgressCounter>,
        errors: ErrorChannel,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            target,
            settings,
            source,
            progress,
            errors,
            shutdown,
        }
    }

    /// Export the table
    ///
    /// Whatever happens while reading, a started serializer always receives
    /// the end marker and is waited for before this returns.
    pub async fn run(self) {
        let start = Instant::now();
        let (tx, rx) = mpsc::channel(self.settings.queue_capacity.max(1));
        let mut serializer = None;

        if let Err(e) = self.read_into_queue(&tx, rx, &mut serializer).await {
            self.errors.report_error(&self.target, &e);
        }

        if let Some(handle) = serializer {
            self.finish_serializer(tx, handle).await;
        }

        log_table_complete!(
            &self.target,
            self.progress.done().max(0),
            start.elapsed(),
            self.shutdown.is_cancelled()
        );
    }

    async fn read_into_queue(
        &self,
        tx: &mpsc::Sender<QueueItem>,
        rx: mpsc::Receiver<QueueItem>,
        serializer: &mut Option<JoinHandle<()>>,
    ) -> Result<()> {
        let token = self.shutdown.token();

        // A job cancelled before its serializer starts leaves no files
        let connection = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            connection = self.source.connect() => connection?,
        };

        let total = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            total = connection.count(&self.target) => total?,
        };
        self.progress.start(total);
        log_table_start!(&self.target, total);

        if token.is_cancelled() {
            return Ok(());
        }
        self.write_info(connection.as_ref()).await?;

        *serializer = Some(self.spawn_serializer(rx));

        let mut rows = connection.stream(&self.target).await?;
        let mut batcher = ProgressBatcher::new(
            Arc::clone(&self.progress),
            self.settings.progress_batch_size,
        );

        let result = loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => break Ok(()),
                next = rows.next() => next,
            };

            let record = match next {
                Some(Ok(record)) => record,
                Some(Err(e)) => break Err(e),
                None => break Ok(()),
            };

            let sent = tokio::select! {
                biased;
                _ = token.cancelled() => break Ok(()),
                sent = tx.send(QueueItem::Row(record)) => sent,
            };
            if sent.is_err() {
                // Serializer is gone; reported when it is joined
                break Ok(());
            }
            batcher.record();
        };

        batcher.flush();
        result
    }

    async fn write_info(&self, connection: &dyn SourceConnection) -> Result<()> {
        let info = connection.info(&self.target).await?;
        let path = table_path(&self.settings.root, &self.target, "info");
        let mut line = serde_json::to_string(&info)?;
        line.push('\n');
        tokio::fs::write(&path, line).await?;
        Ok(())
    }

    fn spawn_serializer(&self, mut rx: mpsc::Receiver<QueueItem>) -> JoinHandle<()> {
        let settings = Arc::clone(&self.settings);
        let target = self.target.clone();
        let errors = self.errors.clone();

        tokio::task::spawn_blocking(move || {
            let path = table_path(&settings.root, &target, settings.format.extension());
            let result = create_writer(settings.format, &path, &settings.filter)
                .and_then(|mut writer| serialize(&mut rx, writer.as_mut(), &settings.filter));

            match result {
                Ok(rows) => tracing::debug!(table = %target, rows, "Serializer finished"),
                Err(e) => errors.report_error(&target, &e),
            }
        })
    }

    async fn finish_serializer(&self, tx: mpsc::Sender<QueueItem>, handle: JoinHandle<()>) {
        let delivered = tx.send(QueueItem::Done).await.is_ok();
        drop(tx);

        let joined = handle.await;
        if let Err(e) = &joined {
            tracing::error!(table = %self.target, error = %e, "Serializer panicked");
        }

        if !delivered || joined.is_err() {
            self.errors.report(
                ErrorRecord::new(ErrorKind::WriterCrash, WRITER_STOPPED)
                    .with_context(self.target.to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemorySource;
    use crate::core::export::summary::error_channel;
    use crate::domain::Record;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;

    fn rows(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| json!({"id": i, "name": format!("row-{i}")}).as_object().cloned().unwrap())
            .collect()
    }

    fn settings(root: &TempDir, format: OutputFormat, filter: FieldFilter) -> Arc<JobSettings> {
        Arc::new(JobSettings {
            root: root.path().to_path_buf(),
            format,
            filter,
            progress_batch_size: 20,
            queue_capacity: 4,
        })
    }

    fn job(
        target: &ExportTarget,
        settings: Arc<JobSettings>,
        source: MemorySource,
        errors: ErrorChannel,
        shutdown: Shutdown,
    ) -> (ExportJob, Arc<ProgressCounter>) {
        let progress = Arc::new(ProgressCounter::new());
        let job = ExportJob::new(
            target.clone(),
            settings,
            Arc::new(source),
            Arc::clone(&progress),
            errors,
            shutdown,
        );
        (job, progress)
    }

    #[tokio::test]
    async fn test_exports_table_in_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let source = MemorySource::new().with_table(target.clone(), rows(45));
        let (errors, mut receiver) = error_channel();

        let (job, progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            source,
            errors,
            Shutdown::new(),
        );
        job.run().await;

        assert!(receiver.drain().is_empty());
        assert_eq!(progress.done(), 45);
        assert_eq!(progress.total(), 45);

        let text = std::fs::read_to_string(dir.path().join("test/users.json")).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        let ids: Vec<u64> = parsed.iter().map(|v| v["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, (0..45).collect::<Vec<u64>>());

        let info = std::fs::read_to_string(dir.path().join("test/users.info")).unwrap();
        assert!(info.ends_with('\n'));
        assert_eq!(info.lines().count(), 1);
        let info: Value = serde_json::from_str(&info).unwrap();
        assert_eq!(info["name"], "users");
    }

    #[tokio::test]
    async fn test_connection_failure_reports_once_without_serializer() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let source = MemorySource::new()
            .with_table(target.clone(), rows(3))
            .with_connect_failure("connection refused");
        let (errors, mut receiver) = error_channel();

        let (job, progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            source,
            errors,
            Shutdown::new(),
        );
        job.run().await;

        let reported = receiver.drain();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].kind, ErrorKind::Connection);
        assert_eq!(reported[0].context.as_deref(), Some("test.users"));
        assert_eq!(progress.done(), -1);
        assert!(!dir.path().join("test/users.json").exists());
    }

    #[tokio::test]
    async fn test_stream_failure_still_closes_container() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let source = MemorySource::new()
            .with_table(target.clone(), rows(10))
            .with_stream_failure(target.clone(), 5, "cursor lost");
        let (errors, mut receiver) = error_channel();

        let (job, progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            source,
            errors,
            Shutdown::new(),
        );
        job.run().await;

        let reported = receiver.drain();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].kind, ErrorKind::Unexpected);
        assert!(reported[0].message.contains("cursor lost"));
        assert_eq!(progress.done(), 5);

        let text = std::fs::read_to_string(dir.path().join("test/users.json")).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 5);
    }

    #[tokio::test]
    async fn test_serializer_failure_reports_writer_crash() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        // A directory where the data file should go makes the writer fail to open
        std::fs::create_dir(dir.path().join("test/users.json")).unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let source = MemorySource::new().with_table(target.clone(), rows(50));
        let (errors, mut receiver) = error_channel();

        let (job, _progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            source,
            errors,
            Shutdown::new(),
        );
        job.run().await;

        let reported = receiver.drain();
        assert_eq!(reported.len(), 2);
        assert!(reported.iter().any(|r| r.kind == ErrorKind::WriterCrash && r.message == WRITER_STOPPED));
    }

    #[tokio::test]
    async fn test_cancel_stops_reading_and_finalizes() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let source = MemorySource::new()
            .with_table(target.clone(), rows(1000))
            .with_row_delay(Duration::from_millis(2));
        let (errors, mut receiver) = error_channel();
        let shutdown = Shutdown::new();

        let (job, progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            source,
            errors,
            shutdown.clone(),
        );
        let handle = tokio::spawn(job.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(receiver.drain().is_empty());
        let done = progress.done();
        assert!(done < 1000);

        let text = std::fs::read_to_string(dir.path().join("test/users.json")).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert!(parsed.len() as i64 <= done);
    }

    #[tokio::test]
    async fn test_cancelled_job_opens_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("test")).unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let source = MemorySource::new().with_table(target.clone(), rows(10));
        let (errors, mut receiver) = error_channel();
        let shutdown = Shutdown::new();
        shutdown.interrupt();

        let (job, progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            source.clone(),
            errors,
            shutdown,
        );
        job.run().await;

        assert!(receiver.drain().is_empty());
        assert_eq!(source.connections_opened(), 0);
        assert_eq!(progress.done(), -1);
        assert!(!dir.path().join("test/users.info").exists());
        assert!(!dir.path().join("test/users.json").exists());
    }

    #[tokio::test]
    async fn test_panicked_serializer_reports_one_writer_crash() {
        let dir = TempDir::new().unwrap();
        let target = ExportTarget::from_names("test", "users").unwrap();
        let (errors, mut receiver) = error_channel();

        let (job, _progress) = job(
            &target,
            settings(&dir, OutputFormat::Json, FieldFilter::all()),
            MemorySource::new(),
            errors,
            Shutdown::new(),
        );

        // The queue stays open, so the end marker is delivered and only the
        // join reveals the crash
        let (tx, _rx) = mpsc::channel(1);
        let handle = tokio::task::spawn_blocking(|| panic!("serializer blew up"));
        job.finish_serializer(tx, handle).await;

        let reported = receiver.drain();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].kind, ErrorKind::WriterCrash);
        assert_eq!(reported[0].message, WRITER_STOPPED);
        assert_eq!(reported[0].context.as_deref(), Some("test.users"));
    }
}
