//! Configuration schema types
//!
//! This module defines the configuration structure for tabledump. Every
//! section has defaults, so an empty file (or no file) is a valid
//! configuration.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Main tabledump configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Row source connection settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DumpConfig {
    /// Validates the configuration
    ///
    /// Format/field compatibility is checked later, when the export options
    /// are built, so that it surfaces as a format error.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Row source (PostgreSQL) connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Host of a cluster node to connect to
    #[serde(default = "default_host")]
    pub host: String,

    /// Client port
    #[serde(default = "default_port")]
    pub port: u16,

    /// User to authenticate as
    #[serde(default = "default_user")]
    pub user: String,

    /// Authorization key / password
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Catalog to connect to; its schemas are exported as databases
    #[serde(default = "default_dbname")]
    pub dbname: String,

    /// Maximum number of concurrent connections (one per running table)
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("source.host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("source.port must be greater than 0".to_string());
        }

        if self.user.trim().is_empty() {
            return Err("source.user cannot be empty".to_string());
        }

        if self.dbname.trim().is_empty() {
            return Err("source.dbname cannot be empty".to_string());
        }

        if self.max_connections == 0 || self.max_connections > 256 {
            return Err(format!(
                "source.max_connections must be between 1 and 256, got {}",
                self.max_connections
            ));
        }

        if self.connect_timeout_seconds == 0 {
            return Err("source.connect_timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Applies a `HOST` or `HOST:PORT` override
    ///
    /// # Errors
    ///
    /// Returns an error if the value has more than one `:` or an invalid port.
    pub fn apply_host_port(&mut self, value: &str) -> Result<(), String> {
        let parts: Vec<&str> = value.split(':').collect();
        match parts.as_slice() {
            [host] if !host.is_empty() => {
                self.host = host.to_string();
            }
            [host, port] if !host.is_empty() => {
                self.host = host.to_string();
                self.port = port
                    .parse()
                    .map_err(|_| format!("Invalid 'host:port' format: {value}"))?;
            }
            _ => return Err(format!("Invalid 'host:port' format: {value}")),
        }
        Ok(())
    }

    /// Connection target safe for logging
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.dbname)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: None,
            dbname: default_dbname(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (json or csv)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output directory; defaults to a timestamped directory in the cwd
    #[serde(default)]
    pub directory: Option<String>,

    /// Fields to keep (required for csv)
    #[serde(default)]
    pub fields: Option<Vec<String>>,

    /// Databases (`db`) or tables (`db.table`) to export; empty means all
    #[serde(default)]
    pub selections: Vec<String>,

    /// Pipeline tuning knobs
    #[serde(default)]
    pub tuning: TuningConfig,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(fields) = &self.fields {
            if fields.iter().all(|f| f.trim().is_empty()) {
                return Err("export.fields cannot be empty when set".to_string());
            }
        }
        if let Some(directory) = &self.directory {
            if directory.trim().is_empty() {
                return Err("export.directory cannot be empty when set".to_string());
            }
        }
        self.tuning.validate()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: None,
            fields: None,
            selections: Vec::new(),
            tuning: TuningConfig::default(),
        }
    }
}

/// Tuning constants for the export pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Rows read between progress counter updates
    #[serde(default = "default_progress_batch_size")]
    pub progress_batch_size: u64,

    /// Interval between orchestrator polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Capacity of the row queue between a reader and its writer
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl TuningConfig {
    fn validate(&self) -> Result<(), String> {
        if self.progress_batch_size == 0 {
            return Err("export.tuning.progress_batch_size must be at least 1".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("export.tuning.poll_interval_ms must be at least 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("export.tuning.queue_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            progress_batch_size: default_progress_batch_size(),
            poll_interval_ms: default_poll_interval_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "logging.local_rotation must be one of: {}, got '{}'",
                valid_rotations.join(", "),
                self.local_rotation
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_dbname() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> usize {
    16
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_format() -> String {
    "json".to_string()
}

fn default_progress_batch_size() -> u64 {
    20
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
