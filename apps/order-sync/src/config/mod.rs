//! Configuration module for order-sync.
//!
//! Configuration is YAML with `${VAR}` / `${VAR:-default}` environment
//! interpolation. Without a config file the built-in template
//! [`DEFAULT_CONFIG`] is used, which reads everything from the environment.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_sync::config::load_config;
//!
//! // Built-in template, driven by environment variables
//! let config = load_config(None)?;
//!
//! // Custom file
//! let config = load_config(Some("order-sync.yaml"))?;
//! println!("database: {}", config.database.host);
//! ```

mod database;
mod env_file;
mod observability;
mod source;
mod sync;

use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use database::DatabaseConfig;
pub use env_file::load_dotenv_from;
pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use source::SourceConfig;
pub use sync::SyncConfig;

/// Configuration used when no file is given.
pub const DEFAULT_CONFIG: &str = r#"
database:
  host: "${DATABASE_HOST:-localhost}"
  port: ${DATABASE_PORT:-5432}
  name: "${DATABASE_NAME:-postgres}"
  user: "${DATABASE_USER:-postgres}"
  password: "${DATABASE_PASS:-password}"
  create_table: ${DATABASE_CREATE_TABLE:-false}

source:
  base_url: "${MOYSKLAD_BASE_URL:-https://api.moysklad.ru/api/remap/1.2}"
  login: "${MOYSKLAD_LOGIN}"
  password: "${MOYSKLAD_PASSWORD}"
  timeout_secs: ${MOYSKLAD_TIMEOUT_SECS}

sync:
  fail_on_store_error: ${SYNC_FAIL_ON_STORE_ERROR:-true}

observability:
  logging:
    level: "${LOG_LEVEL:-info}"
    format: "${LOG_FORMAT:-pretty}"
"#;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// A required value is empty.
    #[error("Missing required setting {setting} (environment variable {env_var})")]
    MissingEnvVar {
        /// Config key.
        setting: &'static str,
        /// Variable the built-in template reads it from.
        env_var: &'static str,
    },

    /// The database URL could not be built.
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Destination database.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Order source API.
    #[serde(default)]
    pub source: SourceConfig,
    /// Sync run behaviour.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Load configuration from a YAML file, or from [`DEFAULT_CONFIG`] when no
/// path is given.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return load_config_from_string(DEFAULT_CONFIG);
    };

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string, interpolating from the process
/// environment.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    load_config_with(yaml, |name| std::env::var(name).ok())
}

/// Load configuration from a YAML string, resolving variables with `lookup`.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_with<F>(yaml: &str, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let interpolated = interpolate_env_vars(yaml, lookup);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Replace `${VAR}` and `${VAR:-default}` with values from `lookup`.
///
/// Empty values count as unset. An unset variable without a default
/// becomes the empty string. Values substituted inside a double-quoted
/// scalar are escaped so they reach the config verbatim; defaults are
/// YAML text and are inserted as written.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    static ENV_VAR_REGEX: OnceLock<Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &Captures<'_>| {
        let start = caps.get(0).map_or(0, |m| m.start());
        match lookup(&caps[1]).filter(|v| !v.is_empty()) {
            Some(value) if in_double_quotes(&input[..start]) => escape_double_quoted(&value),
            Some(value) => value,
            None => caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        }
    })
    .into_owned()
}

/// Whether text following `prefix` on the same line sits inside a YAML
/// double-quoted scalar.
fn in_double_quotes(prefix: &str) -> bool {
    let line = prefix.rsplit('\n').next().unwrap_or_default();

    let mut inside = false;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if inside => {
                chars.next();
            }
            '"' => inside = !inside,
            _ => {}
        }
    }
    inside
}

/// Escape a value for a YAML double-quoted scalar.
fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.source.login.is_empty() {
        return Err(ConfigError::MissingEnvVar {
            setting: "source.login",
            env_var: "MOYSKLAD_LOGIN",
        });
    }

    if config.source.password.is_empty() {
        return Err(ConfigError::MissingEnvVar {
            setting: "source.password",
            env_var: "MOYSKLAD_PASSWORD",
        });
    }

    if Url::parse(&config.source.base_url).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "source.base_url is not a valid URL: {}",
            config.source.base_url
        )));
    }

    if config.database.port == 0 {
        return Err(ConfigError::ValidationError(
            "database.port must be non-zero".to_string(),
        ));
    }

    if config.database.host.is_empty() || config.database.name.is_empty() {
        return Err(ConfigError::ValidationError(
            "database.host and database.name must be set".to_string(),
        ));
    }

    if LevelFilter::from_str(&config.observability.logging.level).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.level is not a log level: {}",
            config.observability.logging.level
        )));
    }

    Ok(())
}
