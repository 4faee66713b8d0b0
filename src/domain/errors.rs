//! Domain error types
//!
//! This module defines the error hierarchy for tabledump. Library code returns
//! [`DumpError`]; per-table failures inside a running export are converted into
//! [`ErrorKind`]-tagged records instead of being propagated.

use std::fmt;
use thiserror::Error;

/// Main tabledump error type
#[derive(Debug, Error)]
pub enum DumpError {
    /// Configuration or usage errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The row source could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// A requested database or table does not exist
    #[error("{0}")]
    NotFound(String),

    /// Unsupported output format or missing field list
    #[error("Format error: {0}")]
    Format(String),

    /// A query against the row source failed
    #[error("Source error: {0}")]
    Source(String),

    /// A serializer failed to write its output
    #[error("Writer error: {0}")]
    Writer(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The export was cancelled by an external signal
    #[error("Interrupted")]
    Interrupted,

    /// One or more export jobs reported errors
    #[error("Errors occurred during export ({0} reported)")]
    JobErrors(usize),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl DumpError {
    /// Classifies the error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            DumpError::Connection(_) => ErrorKind::Connection,
            DumpError::NotFound(_) => ErrorKind::NotFound,
            DumpError::Format(_) => ErrorKind::Format,
            DumpError::Interrupted => ErrorKind::Interrupted,
            _ => ErrorKind::Unexpected,
        }
    }
}

/// Classification of a failure reported by an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cannot reach the source
    Connection,
    /// Requested database or table absent
    NotFound,
    /// Unsupported output format or missing required field list
    Format,
    /// A serializer terminated unexpectedly
    WriterCrash,
    /// Any other fault
    Unexpected,
    /// External cancellation request
    Interrupted,
}

impl ErrorKind {
    /// Name used in error summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Format => "FormatError",
            ErrorKind::WriterCrash => "WriterCrashError",
            ErrorKind::Unexpected => "UnexpectedError",
            ErrorKind::Interrupted => "Interrupted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DumpError {
    fn from(err: serde_json::Error) -> Self {
        DumpError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for DumpError {
    fn from(err: csv::Error) -> Self {
        DumpError::Writer(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DumpError {
    fn from(err: toml::de::Error) -> Self {
        DumpError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio_postgres::Error> for DumpError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            DumpError::Connection(err.to_string())
        } else {
            DumpError::Source(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_error_display() {
        let err = DumpError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_not_found_message_is_verbatim() {
        let err = DumpError::NotFound("Database 'crm' not found".to_string());
        assert_eq!(err.to_string(), "Database 'crm' not found");
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            DumpError::Connection("refused".to_string()).kind(),
            ErrorKind::Connection
        );
        assert_eq!(
            DumpError::NotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(DumpError::Format("x".to_string()).kind(), ErrorKind::Format);
        assert_eq!(DumpError::Interrupted.kind(), ErrorKind::Interrupted);
        assert_eq!(DumpError::Io("x".to_string()).kind(), ErrorKind::Unexpected);
        assert_eq!(
            DumpError::Writer("x".to_string()).kind(),
            ErrorKind::Unexpected
        );
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::Connection.to_string(), "ConnectionError");
        assert_eq!(ErrorKind::WriterCrash.to_string(), "WriterCrashError");
        assert_eq!(ErrorKind::Interrupted.to_string(), "Interrupted");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: DumpError = io_err.into();
        assert!(matches!(err, DumpError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: DumpError = json_err.into();
        assert!(matches!(err, DumpError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: DumpError = toml_err.into();
        assert!(matches!(err, DumpError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_dump_error_implements_std_error() {
        let err = DumpError::Writer("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
