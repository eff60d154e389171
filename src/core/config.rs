//! Logger configuration
//!
//! Field names match the configuration file keys. Zero or empty values are
//! replaced by their documented default before use, see
//! [`Config::merged_with_defaults`].

use super::error::{LoggerError, Result};
use super::timestamp::RFC3339_NANO_LAYOUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LEVEL: &str = "info";
pub const DEFAULT_FILENAME: &str = "logs/app.log";
pub const DEFAULT_ERROR_FILENAME: &str = "logs/error.log";
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
pub const DEFAULT_MAX_BACKUPS: usize = 5;
pub const DEFAULT_MAX_AGE_DAYS: u64 = 30;
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_ASYNC_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_ASYNC_FLUSH_INTERVAL_MS: u64 = 1000;

/// Logger settings
///
/// # Example
///
/// ```
/// use teelog::Config;
///
/// let config = Config::new()
///     .with_level("debug")
///     .with_filename("/var/log/svc/app.log")
///     .with_console(false);
/// assert_eq!(config.max_backups, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// debug, info, warn, error, panic or fatal
    pub level: String,
    /// Main log file path
    pub filename: String,
    /// Error-only log file path
    pub error_filename: String,
    /// Named layout or strftime layout for timestamps
    pub time_format: String,
    /// Max size of one log file in megabytes
    pub max_size: u64,
    /// Number of rotated files to keep
    pub max_backups: usize,
    /// Days to keep rotated files
    pub max_age: u64,
    /// Write buffer size in bytes
    pub buffer_size: usize,
    pub compress: bool,
    pub console: bool,
    pub disable_caller: bool,
    pub disable_stacktrace: bool,
    pub enable_async: bool,
    pub async_buffer_size: usize,
    /// Background flush interval in milliseconds
    pub async_flush_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
            error_filename: DEFAULT_ERROR_FILENAME.to_string(),
            time_format: RFC3339_NANO_LAYOUT.to_string(),
            max_size: DEFAULT_MAX_SIZE_MB,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age: DEFAULT_MAX_AGE_DAYS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            compress: true,
            console: true,
            disable_caller: false,
            disable_stacktrace: false,
            enable_async: false,
            async_buffer_size: DEFAULT_ASYNC_BUFFER_SIZE,
            async_flush_interval: DEFAULT_ASYNC_FLUSH_INTERVAL_MS,
        }
    }
}

/// Shape of a YAML configuration document
#[derive(Debug, Default, Deserialize)]
struct YamlDocument {
    #[serde(default)]
    logger: Config,
}

impl Config {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every zero or empty field with its default.
    ///
    /// Boolean switches are kept as given.
    #[must_use]
    pub fn merged_with_defaults(mut self) -> Self {
        let def = Self::default();
        if self.level.trim().is_empty() {
            self.level = def.level;
        }
        if self.filename.is_empty() {
            self.filename = def.filename;
        }
        if self.error_filename.is_empty() {
            self.error_filename = def.error_filename;
        }
        if self.time_format.is_empty() {
            self.time_format = def.time_format;
        }
        if self.max_size == 0 {
            self.max_size = def.max_size;
        }
        if self.max_backups == 0 {
            self.max_backups = def.max_backups;
        }
        if self.max_age == 0 {
            self.max_age = def.max_age;
        }
        if self.buffer_size == 0 {
            self.buffer_size = def.buffer_size;
        }
        if self.async_buffer_size == 0 {
            self.async_buffer_size = def.async_buffer_size;
        }
        if self.async_flush_interval == 0 {
            self.async_flush_interval = def.async_flush_interval;
        }
        self
    }

    /// Parse the `logger:` section of a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let doc: YamlDocument = serde_yaml::from_str(yaml)?;
        Ok(doc.logger)
    }

    /// Load the `logger:` section of a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoggerError::config(
                "config file",
                format!("config file not found: {}", path.display()),
            ));
        }
        let data = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::config(
                "config file",
                format!("failed to read config file {}: {}", path.display(), e),
            )
        })?;
        Self::from_yaml_str(&data)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size.saturating_mul(1024 * 1024)
    }

    /// Retention horizon for rotated files, `None` when unbounded
    pub fn max_age_duration(&self) -> Option<Duration> {
        (self.max_age > 0).then(|| Duration::from_secs(self.max_age * 24 * 60 * 60))
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.async_flush_interval)
    }

    /// Main log file path, `None` when disabled by an empty name
    pub fn main_path(&self) -> Option<PathBuf> {
        (!self.filename.is_empty()).then(|| PathBuf::from(&self.filename))
    }

    /// Error log file path, `None` when disabled by an empty name
    pub fn error_path(&self) -> Option<PathBuf> {
        (!self.error_filename.is_empty()).then(|| PathBuf::from(&self.error_filename))
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_filename(mut self, filename: impl AsRef<Path>) -> Self {
        self.filename = filename.as_ref().display().to_string();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_error_filename(mut self, filename: impl AsRef<Path>) -> Self {
        self.error_filename = filename.as_ref().display().to_string();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_time_format(mut self, layout: impl Into<String>) -> Self {
        self.time_format = layout.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_rotation(mut self, max_size_mb: u64, max_backups: usize, max_age_days: u64) -> Self {
        self.max_size = max_size_mb;
        self.max_backups = max_backups;
        self.max_age = max_age_days;
        self
    }

    /// Zero counts as unset and is replaced by the default when merged
    #[must_use = "builder methods return a new value"]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_caller(mut self, enabled: bool) -> Self {
        self.disable_caller = !enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_stacktrace(mut self, enabled: bool) -> Self {
        self.disable_stacktrace = !enabled;
        self
    }

    /// Enable the background flusher with the given buffer and interval
    #[must_use = "builder methods return a new value"]
    pub fn with_async(mut self, buffer_size: usize, flush_interval_ms: u64) -> Self {
        self.enable_async = true;
        self.async_buffer_size = buffer_size;
        self.async_flush_interval = flush_interval_ms;
        self
    }
}
