//! Builds the durable output behind a file core

use super::buffered::BufferedSink;
use super::locked::LockedSink;
use super::rotating_file::{RotatingFileWriter, RotationPolicy};
use crate::core::config::Config;
use crate::core::error::{LoggerError, Result};
use crate::core::metrics::LoggerMetrics;
use crate::core::sink::Sink;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Open a rotating writer at `path` and wrap it according to `config`
///
/// The parent directory is created first. With `enable_async` the writer is
/// buffered with `async_buffer_size` bytes and flushed every
/// `async_flush_interval` ms; otherwise a non-zero `buffer_size` buffers it
/// without a flusher, and zero leaves it unbuffered.
///
/// # Errors
///
/// Returns [`LoggerError::Filesystem`] if the directory cannot be created or
/// the file cannot be opened.
pub fn create_writer(path: impl AsRef<Path>, config: &Config) -> Result<Arc<dyn Sink>> {
    create_writer_with_metrics(path, config, &Arc::new(LoggerMetrics::new()))
}

/// [`create_writer`], counting background flush failures in `metrics`
pub fn create_writer_with_metrics(
    path: impl AsRef<Path>,
    config: &Config,
    metrics: &Arc<LoggerMetrics>,
) -> Result<Arc<dyn Sink>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| LoggerError::filesystem("create log directory", parent, e))?;
    }

    let writer = RotatingFileWriter::open(path, RotationPolicy::from_config(config))?;
    let name = path.display().to_string();

    let sink: Arc<dyn Sink> = if config.enable_async {
        Arc::new(BufferedSink::with_flush_interval(
            writer,
            config.async_buffer_size,
            config.flush_interval(),
            name,
            Arc::clone(metrics),
        )?)
    } else if config.buffer_size > 0 {
        Arc::new(BufferedSink::new(writer, config.buffer_size, name))
    } else {
        Arc::new(LockedSink::new(writer, name))
    };
    Ok(sink)
}
