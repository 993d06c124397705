//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SearchSyncConfig;
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::SyncError;
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
/// 3. Parses the TOML into SearchSyncConfig
/// 4. Applies environment variable overrides (SEARCHSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use searchsync::config::loader::load_config;
///
/// let config = load_config("searchsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SearchSyncConfig> {
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

    let contents = substitute_env_vars(&contents)?;

    let mut config: SearchSyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
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
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
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

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SyncError::Configuration(format!("Invalid value '{value}' for environment variable {name}"))
    })
}

/// Applies environment variable overrides using SEARCHSYNC_* prefix
///
/// Environment variables follow the pattern: SEARCHSYNC_<SECTION>_<KEY>
/// For example: SEARCHSYNC_INDEX_URL, SEARCHSYNC_SYNC_PAGE_SIZE
fn apply_env_overrides(config: &mut SearchSyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok().map(|v| (name.to_string(), v));

    // Application overrides
    if let Some((_, val)) = var("SEARCHSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some((name, val)) = var("SEARCHSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override(&name, &val)?;
    }

    // Source overrides
    if let Some((_, val)) = var("SEARCHSYNC_SOURCE_CONNECTION_STRING") {
        config.source.connection_string = secret_string(val);
    }
    if let Some((_, val)) = var("SEARCHSYNC_SOURCE_SCHEMA") {
        config.source.schema = val;
    }
    if let Some((name, val)) = var("SEARCHSYNC_SOURCE_MAX_CONNECTIONS") {
        config.source.max_connections = parse_override(&name, &val)?;
    }
    if let Some((name, val)) = var("SEARCHSYNC_SOURCE_STATEMENT_TIMEOUT_SECONDS") {
        config.source.statement_timeout_seconds = parse_override(&name, &val)?;
    }

    // Index overrides
    if let Some((_, val)) = var("SEARCHSYNC_INDEX_URL") {
        config.index.url = val;
    }
    if let Some((_, val)) = var("SEARCHSYNC_INDEX_USERNAME") {
        config.index.username = Some(val);
    }
    if let Some((_, val)) = var("SEARCHSYNC_INDEX_PASSWORD") {
        config.index.password = secret_string_opt(Some(val));
    }

    // Sync overrides
    if let Some((name, val)) = var("SEARCHSYNC_SYNC_PAGE_SIZE") {
        config.sync.page_size = parse_override(&name, &val)?;
    }
    if let Some((name, val)) = var("SEARCHSYNC_SYNC_MAX_CONSECUTIVE_ERRORS") {
        config.sync.max_consecutive_errors = parse_override(&name, &val)?;
    }
    if let Some((name, val)) = var("SEARCHSYNC_SYNC_RETRY_MAX_ATTEMPTS") {
        config.sync.retry.max_attempts = parse_override(&name, &val)?;
    }

    // Checkpoint overrides
    if let Some((_, val)) = var("SEARCHSYNC_CHECKPOINT_PATH") {
        config.checkpoint.path = val;
    }
    if let Some((name, val)) = var("SEARCHSYNC_CHECKPOINT_DEAD_LETTER") {
        config.checkpoint.dead_letter = parse_override(&name, &val)?;
    }

    // Logging overrides
    if let Some((name, val)) = var("SEARCHSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override(&name, &val)?;
    }
    if let Some((_, val)) = var("SEARCHSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
