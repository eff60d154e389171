//! Structured logger facade
//!
//! A [`Logger`] is a cheap handle: the configured cores are shared behind an
//! `Arc`, and each handle carries its own immutable list of bound fields.
//! Deriving a logger copies that list and appends to the copy, so the parent
//! and every sibling keep exactly the fields they had.

use super::config::Config;
use super::error::Result;
use super::field::{Field, FieldValue};
use super::log_context::{fields_from_context, Context};
use super::log_core::{build_core, Tee};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// State shared by a logger and everything derived from it
struct Shared {
    config: Config,
    core: Tee,
}

/// Leveled structured logger
///
/// # Example
///
/// ```no_run
/// use teelog::{Config, Field, Logger};
///
/// let logger = Logger::new(Config::default().with_filename("logs/svc.log"))?;
/// let request_logger = logger.with_field("request_id", "r-42");
///
/// request_logger.info("Request started", &[Field::new("path", "/health")]);
/// request_logger.sync()?;
/// # Ok::<(), teelog::LoggerError>(())
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    fields: Arc<Vec<Field>>,
}

impl Logger {
    /// Build a logger from `config` after filling in defaults
    ///
    /// The logger is not installed globally, see [`crate::init_logger`].
    ///
    /// # Errors
    ///
    /// Fails on an unknown level or time layout, or when a log file or its
    /// directory cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        let config = config.merged_with_defaults();
        let metrics = Arc::new(LoggerMetrics::new());
        let core = build_core(&config, metrics)?;
        Ok(Self::from_core(config, core))
    }

    /// Wrap an already assembled fan-out
    ///
    /// `config` is kept for [`Logger::config`] and caller/stacktrace
    /// switches; it is not used to open any output.
    pub fn from_core(config: Config, core: Tee) -> Self {
        Self {
            shared: Arc::new(Shared { config, core }),
            fields: Arc::new(Vec::new()),
        }
    }

    /// A logger that discards every record
    pub fn nop() -> Self {
        let config = Config::default()
            .with_filename("")
            .with_error_filename("")
            .with_console(false);
        Self::from_core(config, Tee::nop(Arc::new(LoggerMetrics::new())))
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Fields bound to this handle, in binding order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Counters shared by this logger and everything derived from it
    pub fn metrics(&self) -> &LoggerMetrics {
        self.shared.core.metrics()
    }

    /// Whether any core would write a record at `level`
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.shared.core.enabled(level)
    }

    /// Derive a logger with `key = value` bound
    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Logger {
        self.derive(vec![Field::new(key, value)])
    }

    /// Derive a logger with `fields` bound after the existing ones
    ///
    /// Binding nothing returns a handle equal to this one.
    #[must_use]
    pub fn with_fields<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator,
        I::Item: Into<Field>,
    {
        self.derive(fields.into_iter().map(Into::into).collect())
    }

    /// Derive a logger with every entry of `fields` bound, in key order
    #[must_use]
    pub fn with_fields_map(&self, fields: &HashMap<String, FieldValue>) -> Logger {
        let mut added: Vec<Field> = fields
            .iter()
            .map(|(key, value)| Field::new(key.clone(), value.clone()))
            .collect();
        added.sort_by(|a, b| a.key.cmp(&b.key));
        self.derive(added)
    }

    /// Derive a logger with the fields attached to `ctx`
    #[must_use]
    pub fn with_context(&self, ctx: &Context) -> Logger {
        self.derive(fields_from_context(Some(ctx)).to_vec())
    }

    fn derive(&self, added: Vec<Field>) -> Logger {
        if added.is_empty() {
            return self.clone();
        }
        let mut fields = Vec::with_capacity(self.fields.len() + added.len());
        fields.extend_from_slice(&self.fields);
        fields.extend(added);

        Logger {
            shared: Arc::clone(&self.shared),
            fields: Arc::new(fields),
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, msg: &str, fields: &[Field]) {
        self.emit(level, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[Field]) {
        self.emit(LogLevel::Debug, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        self.emit(LogLevel::Info, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, fields: &[Field]) {
        self.emit(LogLevel::Warn, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, msg: &str, fields: &[Field]) {
        self.emit(LogLevel::Error, msg, fields, Location::caller());
    }

    /// Log at panic level, then panic with `msg`
    #[track_caller]
    pub fn panic(&self, msg: &str, fields: &[Field]) -> ! {
        self.emit(LogLevel::Panic, msg, fields, Location::caller());
        panic!("{}", msg);
    }

    /// Log at fatal level, flush, then exit the process with status 1
    #[track_caller]
    pub fn fatal(&self, msg: &str, fields: &[Field]) -> ! {
        self.emit(LogLevel::Fatal, msg, fields, Location::caller());
        if let Err(e) = self.sync() {
            eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
        }
        std::process::exit(1);
    }

    /// Log a formatted message; formatting is skipped when `level` is disabled
    #[track_caller]
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let caller = Location::caller();
        match args.as_str() {
            Some(msg) => self.emit(level, msg, &[], caller),
            None => self.emit(level, &args.to_string(), &[], caller),
        }
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Debug, args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Warn, args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Error, args);
    }

    fn emit(
        &self,
        level: LogLevel,
        msg: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let config = &self.shared.config;

        let mut entry = LogEntry::new(level, msg).with_fields(&self.fields, fields);
        if !config.disable_caller {
            entry = entry.with_caller(caller);
        }
        if !config.disable_stacktrace && level.wants_stacktrace() {
            entry = entry.with_stacktrace(Backtrace::force_capture().to_string());
        }
        self.shared.core.write(&entry);
    }

    /// Flush every core
    ///
    /// All cores are flushed even when one fails; the first failure is
    /// returned.
    pub fn sync(&self) -> Result<()> {
        self.shared.core.sync()
    }

    /// Flush and give up this handle
    ///
    /// Other handles sharing the same cores keep working.
    pub fn close(self) -> Result<()> {
        self.sync()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::nop()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.shared.config.level)
            .field("cores", &self.shared.core)
            .field("fields", &self.fields)
            .finish()
    }
}
