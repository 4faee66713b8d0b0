//! Export orchestration
//!
//! This module provides the core export logic for tabledump, including:
//! - Export coordination and the polling loop
//! - Per-table workers feeding their serializers
//! - Progress counters and the progress bar
//! - Error records, the error channel and the summary
//! - Cooperative shutdown

pub mod coordinator;
pub mod progress;
pub mod shutdown;
pub mod summary;
pub mod worker;

pub use coordinator::{ExportCoordinator, ExportOptions};
pub use progress::{completion_ratio, ProgressCounter, ProgressTracker};
pub use shutdown::Shutdown;
pub use summary::{error_channel, ErrorChannel, ErrorRecord, ExportSummary, TableReport};
pub use worker::{ExportJob, JobSettings, WRITER_STOPPED};
