//! Export coordinator - main orchestrator for the export process
//!
//! This module launches one [`ExportJob`] per table, then polls until every
//! job has finished: it drains the error channel (cancelling all jobs on the
//! first error), reaps finished jobs, and renders aggregate progress.

use crate::adapters::source::RowSource;
use crate::config::TuningConfig;
use crate::core::export::progress::{ProgressDisplay, ProgressTracker};
use crate::core::export::shutdown::Shutdown;
use crate::core::export::summary::{
    error_channel, ErrorChannel, ErrorReceiver, ErrorRecord, ExportSummary,
};
use crate::core::export::worker::{ExportJob, JobSettings};
use crate::core::serialize::OutputFormat;
use crate::domain::ids::{DatabaseName, ExportTarget};
use crate::domain::{DumpError, ErrorKind, FieldFilter, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What to write and where
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Output root directory
    pub root: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Fields to keep
    pub filter: FieldFilter,

    /// Pipeline tuning
    pub tuning: TuningConfig,

    /// Draw the progress bar on stdout
    pub show_progress: bool,
}

impl ExportOptions {
    /// Create export options with default tuning and no progress bar
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Format`] if the format cannot be written with the
    /// given field filter (CSV without fields).
    pub fn new(root: impl Into<PathBuf>, format: OutputFormat, filter: FieldFilter) -> Result<Self> {
        format.check_fields(&filter)?;
        Ok(Self {
            root: root.into(),
            format,
            filter,
            tuning: TuningConfig::default(),
            show_progress: false,
        })
    }

    /// Set the pipeline tuning
    pub fn with_tuning(mut self, tuning: TuningConfig) -> Self {
        self.tuning = tuning;
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Export coordinator
pub struct ExportCoordinator {
    source: Arc<dyn RowSource>,
    options: ExportOptions,
    shutdown: Shutdown,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(source: Arc<dyn RowSource>, options: ExportOptions, shutdown: Shutdown) -> Self {
        Self {
            source,
            options,
            shutdown,
        }
    }

    /// Create the output root and one subdirectory per database
    ///
    /// # Errors
    ///
    /// Fails if a database directory already exists or cannot be created.
    /// Directories created before the failure are left in place.
    pub async fn prepare_directories(&self, targets: &BTreeSet<ExportTarget>) -> Result<()> {
        let root = &self.options.root;
        tokio::fs::create_dir_all(root).await.map_err(|e| {
            DumpError::Io(format!("Failed to create {}: {}", root.display(), e))
        })?;

        let databases: BTreeSet<&DatabaseName> = targets.iter().map(|t| &t.db).collect();
        for db in databases {
            let path = root.join(db.as_str());
            tokio::fs::create_dir(&path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => DumpError::Io(format!(
                    "Output directory already exists: {}",
                    path.display()
                )),
                _ => DumpError::Io(format!("Failed to create {}: {}", path.display(), e)),
            })?;
        }
        Ok(())
    }

    /// Export every target
    ///
    /// This is the main entry point for the export process. It:
    /// 1. Checks the format against the field filter
    /// 2. Creates the output directories
    /// 3. Launches one job per table
    /// 4. Polls errors, finished jobs and progress until every job is done
    /// 5. Returns the summary; use [`ExportSummary::verdict`] for the outcome
    ///
    /// # Errors
    ///
    /// Returns an error only if the export could not start. Failures of
    /// individual tables are collected in the summary.
    pub async fn run(&self, targets: &BTreeSet<ExportTarget>) -> Result<ExportSummary> {
        let start_time = Instant::now();

        self.options.format.check_fields(&self.options.filter)?;
        self.prepare_directories(targets).await?;

        tracing::info!(
            source = %self.source.describe(),
            tables = targets.len(),
            format = %self.options.format,
            root = %self.options.root.display(),
            "Starting export"
        );

        let (errors, mut receiver) = error_channel();
        let mut tracker = ProgressTracker::new();
        let mut running = self.launch(targets, &mut tracker, &errors);

        let display = ProgressDisplay::new(self.options.show_progress);
        let mut summary = ExportSummary::new();
        summary.total_tables = targets.len();

        let poll = Duration::from_millis(self.options.tuning.poll_interval_ms.max(1));
        let mut interval = tokio::time::interval(poll);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !running.is_empty() {
            interval.tick().await;

            self.collect_errors(&mut receiver, &mut summary);

            let (finished, still_running): (Vec<_>, Vec<_>) = running
                .into_iter()
                .partition(|(_, handle)| handle.is_finished());
            running = still_running;
            for (target, handle) in finished {
                if let Err(e) = handle.await {
                    errors.report(
                        ErrorRecord::new(ErrorKind::Unexpected, format!("Export job failed: {}", e))
                            .with_context(target.to_string()),
                    );
                }
            }

            display.render(tracker.completion());
        }

        self.collect_errors(&mut receiver, &mut summary);
        summary.interrupted = self.shutdown.is_interrupted();

        let complete = summary.errors.is_empty() && !summary.interrupted;
        display.finish(complete);

        summary.final_progress = if complete { 1.0 } else { tracker.completion() };
        summary.rows_exported = tracker.rows_done();
        summary.tables = tracker.reports();

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn launch(
        &self,
        targets: &BTreeSet<ExportTarget>,
        tracker: &mut ProgressTracker,
        errors: &ErrorChannel,
    ) -> Vec<(ExportTarget, JoinHandle<()>)> {
        let settings = Arc::new(JobSettings {
            root: self.options.root.clone(),
            format: self.options.format,
            filter: self.options.filter.clone(),
            progress_batch_size: self.options.tuning.progress_batch_size,
            queue_capacity: self.options.tuning.queue_capacity,
        });

        targets
            .iter()
            .map(|target| {
                let job = ExportJob::new(
                    target.clone(),
                    Arc::clone(&settings),
                    Arc::clone(&self.source),
                    tracker.register(target.clone()),
                    errors.clone(),
                    self.shutdown.clone(),
                );
                (target.clone(), tokio::spawn(job.run()))
            })
            .collect()
    }

    /// Move queued error records into the summary, cancelling on the first one
    fn collect_errors(&self, receiver: &mut ErrorReceiver, summary: &mut ExportSummary) {
        for record in receiver.drain() {
            summary.add_error(record);
        }

        if !summary.errors.is_empty() && !self.shutdown.is_cancelled() {
            tracing::warn!(
                error_count = summary.errors.len(),
                "Error reported, cancelling remaining tables"
            );
            self.shutdown.cancel();
        }
    }
}
