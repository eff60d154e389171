//! Core logger types and traits

pub mod config;
pub mod encoder;
pub mod error;
pub mod field;
pub mod log_context;
pub mod log_core;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod sink;
pub mod timestamp;

pub use config::Config;
pub use encoder::{Encoder, EncoderConfig};
pub use error::{LoggerError, Result, UNINITIALIZED_ACCESS};
pub use field::{Field, FieldValue};
pub use log_context::{
    fields_from_context, request_id, store_fields, with_request_id, Context, REQUEST_ID_HEADER,
};
pub use log_core::{build_core, Core, IoCore, NopCore, Tee};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use registry::{
    close, from_context, get_logger, init_logger, init_logger_from_yaml, init_logger_strict,
    try_get_logger,
};
pub use sink::Sink;
pub use timestamp::{TimestampFormat, RFC3339_NANO_LAYOUT};
