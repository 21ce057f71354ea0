//! Configuration loading and validation for RustedGuard.
//!
//! Loads configuration from `~/.rustedguard/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! Configuration only shapes the surroundings of the pipeline: input limits,
//! logging, audit retention and batch parallelism. No key here can change a
//! classification, selection, override or invariant rule.

use rustedguard_core::identity::MAX_TRACE_ID_LEN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hard ceiling on `input.max_chars`.
pub const MAX_INPUT_CHARS: usize = 100_000;

/// Hard ceiling on `batch.max_parallel`.
pub const MAX_PARALLEL: usize = 256;

/// The root configuration structure.
///
/// Maps directly to `~/.rustedguard/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream input limits
    #[serde(default)]
    pub input: InputConfig,

    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Audit trail settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Batch assessment settings
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Longest accepted message, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_max_trace_id_len")]
    pub max_trace_id_len: usize,
}

fn default_max_chars() -> usize {
    4000
}
fn default_max_trace_id_len() -> usize {
    MAX_TRACE_ID_LEN
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_trace_id_len: default_max_trace_id_len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::ValidationError(format!(
                "unknown log format '{other}' (expected pretty or json)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".into()
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entries kept in memory before the oldest are dropped
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_true() -> bool {
    true
}
fn default_max_entries() -> usize {
    5000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Messages assessed concurrently
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_max_parallel() -> usize {
    8
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.rustedguard/config.toml).
    ///
    /// Environment overrides, highest priority:
    /// - `RUSTEDGUARD_LOG_LEVEL`
    /// - `RUSTEDGUARD_LOG_FORMAT`
    /// - `RUSTEDGUARD_MAX_CHARS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in
    /// [`AppConfig::load`]) and re-validate.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("RUSTEDGUARD_LOG_LEVEL") {
            self.logging.level = level.to_ascii_lowercase();
        }

        if let Some(format) = lookup("RUSTEDGUARD_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        if let Some(max_chars) = lookup("RUSTEDGUARD_MAX_CHARS") {
            self.input.max_chars = max_chars.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "RUSTEDGUARD_MAX_CHARS must be a positive integer, got '{max_chars}'"
                ))
            })?;
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rustedguard")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.input.max_chars == 0 || self.input.max_chars > MAX_INPUT_CHARS {
            return Err(ConfigError::ValidationError(format!(
                "input.max_chars must be between 1 and {MAX_INPUT_CHARS}"
            )));
        }

        if self.input.max_trace_id_len == 0 || self.input.max_trace_id_len > MAX_TRACE_ID_LEN {
            return Err(ConfigError::ValidationError(format!(
                "input.max_trace_id_len must be between 1 and {MAX_TRACE_ID_LEN}"
            )));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }

        if self.audit.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "audit.max_entries must be > 0".into(),
            ));
        }

        if self.batch.max_parallel == 0 || self.batch.max_parallel > MAX_PARALLEL {
            return Err(ConfigError::ValidationError(format!(
                "batch.max_parallel must be between 1 and {MAX_PARALLEL}"
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
