//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::DumpConfig;
use crate::config::secret_string;
use crate::domain::errors::DumpError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DumpConfig
/// 4. Applies environment variable overrides (TABLEDUMP_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use tabledump::config::loader::load_config;
///
/// let config = load_config("tabledump.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DumpConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DumpError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DumpError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: DumpConfig = toml::from_str(&contents)
        .map_err(|e| DumpError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DumpError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Loads the configuration file if it exists, defaults otherwise
///
/// Used for the implicit default path: a missing `tabledump.toml` is not an
/// error, but an explicitly requested file must exist.
pub fn load_config_or_default(path: impl AsRef<Path>, explicit: bool) -> Result<DumpConfig> {
    let path = path.as_ref();
    if path.exists() || explicit {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file found, using defaults");
    let mut config = DumpConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        DumpError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment variable pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        // Comment lines are copied untouched
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DumpError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse().map_err(|_| {
        DumpError::Configuration(format!("Invalid value for {name}: '{val}'"))
    })
}

/// Applies environment variable overrides using TABLEDUMP_* prefix
///
/// Environment variables follow the pattern: TABLEDUMP_<SECTION>_<KEY>
/// For example: TABLEDUMP_SOURCE_HOST, TABLEDUMP_EXPORT_FORMAT
fn apply_env_overrides(config: &mut DumpConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("TABLEDUMP_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Source overrides
    if let Ok(val) = std::env::var("TABLEDUMP_SOURCE_HOST") {
        config.source.host = val;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_SOURCE_PORT") {
        config.source.port = parse_env("TABLEDUMP_SOURCE_PORT", &val)?;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_SOURCE_USER") {
        config.source.user = val;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_SOURCE_PASSWORD") {
        config.source.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("TABLEDUMP_SOURCE_DBNAME") {
        config.source.dbname = val;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_SOURCE_MAX_CONNECTIONS") {
        config.source.max_connections = parse_env("TABLEDUMP_SOURCE_MAX_CONNECTIONS", &val)?;
    }

    // Export overrides
    if let Ok(val) = std::env::var("TABLEDUMP_EXPORT_FORMAT") {
        config.export.format = val;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_EXPORT_DIRECTORY") {
        config.export.directory = Some(val);
    }
    if let Ok(val) = std::env::var("TABLEDUMP_EXPORT_PROGRESS_BATCH_SIZE") {
        config.export.tuning.progress_batch_size =
            parse_env("TABLEDUMP_EXPORT_PROGRESS_BATCH_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_EXPORT_POLL_INTERVAL_MS") {
        config.export.tuning.poll_interval_ms =
            parse_env("TABLEDUMP_EXPORT_POLL_INTERVAL_MS", &val)?;
    }
    if let Ok(val) = std::env::var("TABLEDUMP_EXPORT_QUEUE_CAPACITY") {
        config.export.tuning.queue_capacity = parse_env("TABLEDUMP_EXPORT_QUEUE_CAPACITY", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("TABLEDUMP_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("TABLEDUMP_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
