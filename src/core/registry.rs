//! Process-wide logger
//!
//! The first successful initialization installs the global logger; later
//! calls leave it in place. A failed initialization installs nothing, so a
//! later call may still succeed.

use super::config::Config;
use super::error::{LoggerError, Result, UNINITIALIZED_ACCESS};
use super::log_context::Context;
use super::logger::Logger;
use once_cell::sync::OnceCell;
use std::path::Path;

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Install the global logger unless one is already installed
///
/// Only the first successful call takes effect; later configurations are
/// ignored. Concurrent callers block until the first one finishes.
///
/// # Errors
///
/// Returns the construction error of this call's configuration when nothing
/// was installed yet.
pub fn init_logger(config: Config) -> Result<()> {
    GLOBAL_LOGGER.get_or_try_init(|| Logger::new(config)).map(|_| ())
}

/// Load the `logger:` section of a YAML file and install it
///
/// # Errors
///
/// Fails with a configuration error when the file is missing or malformed,
/// even if a logger is already installed.
pub fn init_logger_from_yaml(path: impl AsRef<Path>) -> Result<()> {
    let config = Config::from_yaml_file(path)?;
    init_logger(config)
}

/// Install the global logger, rejecting a conflicting reinitialization
///
/// Succeeds when nothing was installed, or when the installed logger was
/// built from the same configuration once defaults are filled in.
pub fn init_logger_strict(config: Config) -> Result<()> {
    let wanted = config.clone().merged_with_defaults();
    let installed = GLOBAL_LOGGER.get_or_try_init(|| Logger::new(config))?;
    if installed.config() == &wanted {
        Ok(())
    } else {
        Err(LoggerError::conflict(format!(
            "logger already initialized with a different configuration (level '{}', file '{}')",
            installed.config().level,
            installed.config().filename
        )))
    }
}

/// The global logger
///
/// # Panics
///
/// Panics when no logger has been installed.
pub fn get_logger() -> &'static Logger {
    match GLOBAL_LOGGER.get() {
        Some(logger) => logger,
        None => panic!("{}", UNINITIALIZED_ACCESS),
    }
}

/// The global logger, or `None` before initialization
pub fn try_get_logger() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}

/// The logger bound to `ctx`, falling back to the global logger
///
/// Never panics: before initialization the fallback is [`Logger::nop`].
pub fn from_context(ctx: &Context) -> Logger {
    ctx.logger()
        .or_else(|| GLOBAL_LOGGER.get())
        .cloned()
        .unwrap_or_else(Logger::nop)
}

/// Flush the global logger; it stays installed and usable
pub fn close() -> Result<()> {
    match GLOBAL_LOGGER.get() {
        Some(logger) => logger.sync(),
        None => Ok(()),
    }
}
