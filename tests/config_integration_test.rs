//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use std::io::Write;
use std::sync::Mutex;
use tabledump::cli::commands::export::ExportArgs;
use tabledump::config::{load_config, load_config_or_default};
use tabledump::core::serialize::OutputFormat;
use tabledump::domain::DumpError;
use tempfile::{NamedTempFile, TempDir};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("TABLEDUMP_APPLICATION_LOG_LEVEL");
    std::env::remove_var("TABLEDUMP_SOURCE_HOST");
    std::env::remove_var("TABLEDUMP_SOURCE_PORT");
    std::env::remove_var("TABLEDUMP_EXPORT_FORMAT");
    std::env::remove_var("TABLEDUMP_EXPORT_QUEUE_CAPACITY");
    std::env::remove_var("TEST_TABLEDUMP_PASSWORD");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_TABLEDUMP_PASSWORD", "s3cret");

    let file = write_config(
        r#"
[application]
log_level = "debug"

[source]
host = "db.internal"
port = 6543
user = "exporter"
password = "${TEST_TABLEDUMP_PASSWORD}"
dbname = "warehouse"
max_connections = 8

[export]
format = "csv"
directory = "/tmp/tabledump-out"
fields = ["id", "name"]
selections = ["sales.orders"]

[export.tuning]
progress_batch_size = 50
poll_interval_ms = 250
queue_capacity = 64

[logging]
local_enabled = true
local_path = "/tmp/tabledump-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.source.host, "db.internal");
    assert_eq!(config.source.port, 6543);
    assert_eq!(config.source.max_connections, 8);
    assert!(config.source.password.is_some());
    assert_eq!(config.export.format, "csv");
    assert_eq!(config.export.selections, vec!["sales.orders".to_string()]);
    assert_eq!(config.export.tuning.queue_capacity, 64);
    assert_eq!(config.logging.local_rotation, "hourly");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[source]
password = "${TEST_TABLEDUMP_PASSWORD}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, DumpError::Configuration(_)));
    assert!(err.to_string().contains("TEST_TABLEDUMP_PASSWORD"));
}

#[test]
fn test_env_overrides_win_over_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TABLEDUMP_SOURCE_HOST", "override-host");
    std::env::set_var("TABLEDUMP_SOURCE_PORT", "7000");
    std::env::set_var("TABLEDUMP_EXPORT_QUEUE_CAPACITY", "16");

    let file = write_config(
        r#"
[source]
host = "file-host"
port = 5432
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.source.host, "override-host");
    assert_eq!(config.source.port, 7000);
    assert_eq!(config.export.tuning.queue_capacity, 16);

    cleanup_env_vars();
}

#[test]
fn test_invalid_env_override_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TABLEDUMP_SOURCE_PORT", "not-a-port");

    let result = load_config_or_default("/nonexistent/tabledump.toml", false);
    assert!(result.is_err());

    cleanup_env_vars();
}

#[test]
fn test_missing_default_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load_config_or_default("/nonexistent/tabledump.toml", false).unwrap();
    assert_eq!(config.source.host, "localhost");
    assert_eq!(config.source.port, 5432);
    assert_eq!(config.export.format, "json");

    let err = load_config_or_default("/nonexistent/tabledump.toml", true).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for contents in [
        "[application]\nlog_level = \"loud\"\n",
        "[source]\nmax_connections = 0\n",
        "[export.tuning]\nqueue_capacity = 0\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ] {
        let file = write_config(contents);
        let err = load_config(file.path()).unwrap_err();
        assert!(
            err.to_string().contains("validation failed"),
            "expected validation error for {contents:?}, got {err}"
        );
    }
}

#[test]
fn test_configured_csv_export_plan() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    let out = TempDir::new().unwrap();

    let file = write_config(
        r#"
[export]
format = "csv"
fields = ["id", "total"]
selections = ["sales.orders"]
"#,
    );
    let config = load_config(file.path()).unwrap();

    let args = ExportArgs {
        directory: Some(out.path().join("dump")),
        ..ExportArgs::default()
    };
    let plan = args.plan(&config).unwrap();
    assert_eq!(plan.options.format, OutputFormat::Csv);
    assert_eq!(plan.selections.len(), 1);

    // Command-line format wins
    let args = ExportArgs {
        directory: Some(out.path().join("dump")),
        format: Some("json".to_string()),
        ..ExportArgs::default()
    };
    assert_eq!(args.plan(&config).unwrap().options.format, OutputFormat::Json);
}
