//! Output destinations behind the cores

pub mod buffered;
pub mod console;
pub mod factory;
pub mod locked;
pub mod rotating_file;

pub use crate::core::sink::Sink;
pub use buffered::{buffer_capacity, BufferedSink, MIN_BUFFER_SIZE};
pub use console::{console_sink, ConsoleSink, CONSOLE_SINK_NAME};
pub use factory::{create_writer, create_writer_with_metrics};
pub use locked::LockedSink;
pub use rotating_file::{RotatingFileWriter, RotationPolicy};
