//! Configuration management for tabledump.
//!
//! # Overview
//!
//! tabledump reads an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TABLEDUMP_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! Command-line flags of the `export` command override the file.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! host = "db.internal"
//! port = 5432
//! user = "exporter"
//! password = "${TABLEDUMP_PASSWORD}"
//! dbname = "warehouse"
//!
//! [export]
//! format = "csv"
//! fields = ["id", "created_at", "total"]
//! selections = ["sales.orders"]
//!
//! [export.tuning]
//! progress_batch_size = 20
//! poll_interval_ms = 100
//! queue_capacity = 1024
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, DumpConfig, ExportConfig, LoggingConfig, SourceConfig, TuningConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
