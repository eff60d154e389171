//! # teelog
//!
//! A process-wide structured logger that fans every record out to several
//! cores with independent thresholds.
//!
//! ## Features
//!
//! - **Fan-out**: main JSON file, error-only JSON file and colored console
//! - **Rotation**: size-bounded files with numbered, optionally gzipped backups
//! - **Derived loggers**: immutable handles that accumulate bound fields
//! - **Context fields**: request-scoped metadata attached at log time
//! - **Buffering**: optional in-memory buffering with a background flusher
//!
//! ## Example
//!
//! ```no_run
//! use teelog::{get_logger, init_logger, store_fields, Config, Field};
//!
//! init_logger(Config::default().with_level("debug"))?;
//!
//! let ctx = store_fields(None, [Field::new("request_id", "r-42")]);
//! let logger = get_logger().with_context(&ctx);
//! logger.info("Request handled", &[Field::new("status", 200)]);
//!
//! teelog::close()?;
//! # Ok::<(), teelog::LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        fields_from_context, get_logger, init_logger, store_fields, Config, Context, Field,
        FieldValue, LogLevel, Logger, LoggerError, Result,
    };
}

pub use crate::core::{
    build_core, close, fields_from_context, from_context, get_logger, init_logger,
    init_logger_from_yaml, init_logger_strict, request_id, store_fields, try_get_logger,
    with_request_id, Config, Context, Core, Encoder, EncoderConfig, Field, FieldValue, IoCore,
    LogEntry, LogLevel, Logger, LoggerError, LoggerMetrics, NopCore, Result, Sink, Tee,
    TimestampFormat, REQUEST_ID_HEADER, RFC3339_NANO_LAYOUT, UNINITIALIZED_ACCESS,
};
