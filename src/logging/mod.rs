//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console logs on stderr (stdout carries the progress bar)
//! - Configurable log levels
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use tabledump::logging::init_logging;
//! use tabledump::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a table export
///
/// # Example
///
/// ```no_run
/// use tabledump::log_table_start;
/// use tabledump::domain::ExportTarget;
///
/// let target = ExportTarget::from_names("test", "users").unwrap();
/// log_table_start!(&target, 150u64);
/// ```
#[macro_export]
macro_rules! log_table_start {
    ($target:expr, $total:expr) => {
        tracing::info!(
            table = %$target,
            rows_total = $total,
            "Starting table export"
        );
    };
}

/// Log the end of a table export
///
/// # Example
///
/// ```no_run
/// use tabledump::log_table_complete;
/// use tabledump::domain::ExportTarget;
/// use std::time::Duration;
///
/// let target = ExportTarget::from_names("test", "users").unwrap();
/// log_table_complete!(&target, 150u64, Duration::from_secs(2), false);
/// ```
#[macro_export]
macro_rules! log_table_complete {
    ($target:expr, $rows:expr, $duration:expr, $cancelled:expr) => {
        tracing::info!(
            table = %$target,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            cancelled = $cancelled,
            "Table export finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tabledump::log_error_with_context;
/// use tabledump::domain::DumpError;
///
/// let error = DumpError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
