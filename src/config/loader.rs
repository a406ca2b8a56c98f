//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use crate::domain::EntityKind;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`SyncConfig`]
/// 4. Applies environment variable overrides (`CATALOG_SYNC_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `SyncError::Configuration` if the file cannot be read, a
/// referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use catalog_sync::config::loader::load_config;
///
/// let config = load_config("catalog-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Parses configuration text after `${VAR}` substitution, without validation
pub fn parse_config(contents: &str) -> Result<SyncConfig> {
    let contents = substitute_env_vars(contents)?;

    toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {}", e)))
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched so documented placeholders never
/// require the variable to be set.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
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
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `CATALOG_SYNC_*` prefix
///
/// Variables follow the pattern `CATALOG_SYNC_<SECTION>_<KEY>`, for example
/// `CATALOG_SYNC_TARGET_MAX_CONNECTIONS`. Unparseable numeric values are
/// rejected rather than silently ignored.
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CATALOG_SYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Source overrides
    if let Ok(val) = std::env::var("CATALOG_SYNC_SOURCE_CONNECTION_STRING") {
        config.source.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("CATALOG_SYNC_SOURCE_DATABASE") {
        config.source.database = val;
    }
    if let Some(val) = env_number("CATALOG_SYNC_SOURCE_CONNECT_TIMEOUT_SECONDS")? {
        config.source.connect_timeout_seconds = val;
    }

    // Target overrides
    if let Ok(val) = std::env::var("CATALOG_SYNC_TARGET_CONNECTION_STRING") {
        config.target.connection_string = secret_string(val);
    }
    if let Some(val) = env_number("CATALOG_SYNC_TARGET_MAX_CONNECTIONS")? {
        config.target.max_connections = val;
    }
    if let Some(val) = env_number("CATALOG_SYNC_TARGET_STATEMENT_TIMEOUT_SECONDS")? {
        config.target.statement_timeout_seconds = val;
    }
    if let Ok(val) = std::env::var("CATALOG_SYNC_TARGET_SSL_MODE") {
        config.target.ssl_mode = val;
    }

    // Sync overrides
    if let Ok(val) = std::env::var("CATALOG_SYNC_SYNC_ENTITIES") {
        config.sync.entities = parse_entity_list(&val).map_err(SyncError::Configuration)?;
    }
    if let Some(val) = env_number("CATALOG_SYNC_SYNC_IDLE_INTERVAL_SECONDS")? {
        config.sync.idle_interval_seconds = val;
    }
    if let Some(val) = env_number("CATALOG_SYNC_SYNC_SHUTDOWN_TIMEOUT_SECS")? {
        config.sync.shutdown_timeout_secs = val;
    }

    // Logging overrides
    if let Some(val) = env_bool("CATALOG_SYNC_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("CATALOG_SYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            SyncError::Configuration(format!("{name} must be a number, got '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            SyncError::Configuration(format!("{name} must be true or false, got '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Parses a comma-separated list of entity kinds, e.g. `product,shop`
pub fn parse_entity_list(raw: &str) -> std::result::Result<Vec<EntityKind>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
