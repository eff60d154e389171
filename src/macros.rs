//! Formatting macros for the leveled facet
//!
//! Each macro forwards `format_args!` to the matching `*f` method, so the
//! message is only formatted when the level is enabled and the caller
//! recorded is the macro call site.
//!
//! # Examples
//!
//! ```
//! use teelog::{info, Logger};
//!
//! let logger = Logger::nop();
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a formatted message at the given level.
///
/// ```
/// # use teelog::{LogLevel, Logger};
/// use teelog::log;
/// let logger = Logger::nop();
/// log!(logger, LogLevel::Warn, "Retry {} of {}", 1, 3);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::std::format_args!($($arg)+))
    };
}

/// Log a formatted debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(::std::format_args!($($arg)+))
    };
}

/// Log a formatted warn-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted error-level message.
///
/// ```
/// # use teelog::Logger;
/// use teelog::error;
/// let logger = Logger::nop();
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::std::format_args!($($arg)+))
    };
}
