//! Standard output sink

use super::buffered::BufferedSink;
use super::locked::LockedSink;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::metrics::LoggerMetrics;
use crate::core::sink::Sink;
use std::io;
use std::sync::Arc;

pub const CONSOLE_SINK_NAME: &str = "console";

/// Unbuffered stdout
pub type ConsoleSink = LockedSink<io::Stdout>;

impl ConsoleSink {
    pub fn stdout() -> Self {
        LockedSink::new(io::stdout(), CONSOLE_SINK_NAME)
    }
}

/// Stdout sink for `config`
///
/// Console output is only buffered when async flushing is enabled, so
/// interactive output shows up immediately by default.
pub fn console_sink(config: &Config, metrics: &Arc<LoggerMetrics>) -> Result<Arc<dyn Sink>> {
    if config.enable_async {
        let sink = BufferedSink::with_flush_interval(
            io::stdout(),
            config.async_buffer_size,
            config.flush_interval(),
            CONSOLE_SINK_NAME,
            Arc::clone(metrics),
        )?;
        Ok(Arc::new(sink))
    } else {
        Ok(Arc::new(ConsoleSink::stdout()))
    }
}
