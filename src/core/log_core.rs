//! Cores and their fan-out
//!
//! A core pairs an [`Encoder`] with a [`Sink`] and a minimum level. The
//! [`Tee`] offers every record to each of its cores; a core that rejects the
//! level or fails to write never keeps the record from the others.

use super::config::Config;
use super::encoder::{Encoder, EncoderConfig};
use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::metrics::{should_alert, LoggerMetrics};
use super::sink::Sink;
use super::timestamp::TimestampFormat;
use crate::sinks::{console_sink, create_writer_with_metrics};
use std::fmt;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Initial capacity of the per-record encode buffer
const ENCODE_BUFFER_CAPACITY: usize = 256;

/// A filtered, encoded output
pub trait Core: Send + Sync {
    /// Whether a record at `level` would be written
    fn enabled(&self, level: LogLevel) -> bool;

    /// Encode and write one record; records below the threshold are ignored
    fn write(&self, entry: &LogEntry<'_>) -> io::Result<()>;

    /// Flush buffered output
    fn sync(&self) -> Result<()>;

    fn name(&self) -> &str;
}

/// Core writing encoded records to a sink
pub struct IoCore {
    encoder: Encoder,
    sink: Arc<dyn Sink>,
    min_level: LogLevel,
}

impl IoCore {
    pub fn new(encoder: Encoder, sink: Arc<dyn Sink>, min_level: LogLevel) -> Self {
        Self {
            encoder,
            sink,
            min_level,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }
}

impl Core for IoCore {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn write(&self, entry: &LogEntry<'_>) -> io::Result<()> {
        if !self.enabled(entry.level) {
            return Ok(());
        }
        let mut buf = Vec::with_capacity(ENCODE_BUFFER_CAPACITY);
        self.encoder.encode(entry, &mut buf)?;
        // One call per record keeps concurrent lines whole
        self.sink.write_all(&buf)?;

        // Panic and fatal records must reach the destination before the
        // process unwinds or exits
        if entry.level > LogLevel::Error {
            self.sink
                .sync()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.sink.sync()
    }

    fn name(&self) -> &str {
        self.sink.name()
    }
}

/// Core that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NopCore;

impl Core for NopCore {
    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn write(&self, _entry: &LogEntry<'_>) -> io::Result<()> {
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "nop"
    }
}

/// Fan-out over a fixed set of cores
pub struct Tee {
    cores: Vec<Box<dyn Core>>,
    metrics: Arc<LoggerMetrics>,
}

impl Tee {
    pub fn new(cores: Vec<Box<dyn Core>>, metrics: Arc<LoggerMetrics>) -> Self {
        let cores = if cores.is_empty() {
            vec![Box::new(NopCore) as Box<dyn Core>]
        } else {
            cores
        };
        Self { cores, metrics }
    }

    /// A fan-out whose only core is [`NopCore`]
    pub fn nop(metrics: Arc<LoggerMetrics>) -> Self {
        Self::new(Vec::new(), metrics)
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Names of the cores, in fan-out order
    pub fn core_names(&self) -> Vec<String> {
        self.cores.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.metrics
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.cores.iter().any(|c| c.enabled(level))
    }

    /// Offer `entry` to every core
    ///
    /// Failures are counted and reported on stderr, never returned: logging
    /// does not fail the caller.
    pub fn write(&self, entry: &LogEntry<'_>) {
        let mut written = false;

        for core in self.cores.iter().filter(|c| c.enabled(entry.level)) {
            match catch_unwind(AssertUnwindSafe(|| core.write(entry))) {
                Ok(Ok(())) => written = true,
                Ok(Err(e)) => {
                    let previous = self.metrics.record_write_error();
                    if should_alert(previous) {
                        eprintln!(
                            "[LOGGER ERROR] Core '{}' failed to write record: {} ({} failures)",
                            core.name(),
                            e,
                            previous + 1
                        );
                    }
                }
                Err(panic_info) => {
                    self.metrics.record_write_error();
                    eprintln!(
                        "[LOGGER CRITICAL] Core '{}' panicked: {}. Other cores continue to function.",
                        core.name(),
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }

        if written {
            self.metrics.record_written();
        }
    }

    /// Flush every core, returning the first failure
    ///
    /// A failing core does not stop the remaining ones from being flushed.
    pub fn sync(&self) -> Result<()> {
        let mut first_error = None;
        for core in &self.cores {
            if let Err(e) = core.sync() {
                self.metrics.record_flush_error();
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for Tee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tee")
            .field("cores", &self.core_names())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Encoder settings derived from `config`
pub fn encoder_config(config: &Config) -> Result<EncoderConfig> {
    Ok(EncoderConfig {
        timestamp_format: TimestampFormat::from_layout(&config.time_format)?,
        include_caller: !config.disable_caller,
        include_stacktrace: !config.disable_stacktrace,
    })
}

/// Parse the configured level
pub fn parse_level(config: &Config) -> Result<LogLevel> {
    config
        .level
        .parse()
        .map_err(|message: String| LoggerError::config("level", message))
}

/// Assemble the fan-out described by `config`
///
/// - main file: JSON, configured level
/// - error file: JSON, error level and above
/// - console: console encoding, configured level
///
/// `config` is used as given; callers merge defaults first. With no output
/// configured the result holds a single [`NopCore`].
pub fn build_core(config: &Config, metrics: Arc<LoggerMetrics>) -> Result<Tee> {
    let level = parse_level(config)?;
    let encoding = encoder_config(config)?;
    let mut cores: Vec<Box<dyn Core>> = Vec::with_capacity(3);

    if let Some(path) = config.main_path() {
        let sink = create_writer_with_metrics(&path, config, &metrics)?;
        cores.push(Box::new(IoCore::new(Encoder::json(encoding.clone()), sink, level)));
    }

    if let Some(path) = config.error_path() {
        let sink = create_writer_with_metrics(&path, config, &metrics)?;
        cores.push(Box::new(IoCore::new(
            Encoder::json(encoding.clone()),
            sink,
            LogLevel::Error,
        )));
    }

    if config.console {
        cores.push(Box::new(IoCore::new(
            Encoder::console(encoding, true),
            console_sink(config, &metrics)?,
            level,
        )));
    }

    Ok(Tee::new(cores, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::Field;
    use crate::sinks::LockedSink;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Sink recording writes in memory
    #[derive(Default)]
    struct MemorySink {
        data: Mutex<Vec<u8>>,
    }

    impl MemorySink {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.data.lock().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl Sink for MemorySink {
        fn write_all(&self, buf: &[u8]) -> io::Result<()> {
            self.data.lock().extend_from_slice(buf);
            Ok(())
        }

        fn sync(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    /// Sink failing every operation and counting sync attempts
    #[derive(Default)]
    struct FailingSink {
        syncs: AtomicUsize,
    }

    impl Sink for FailingSink {
        fn write_all(&self, _buf: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        }

        fn sync(&self) -> Result<()> {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            Err(LoggerError::flush(
                "failing",
                io::Error::new(io::ErrorKind::Other, "broken pipe"),
            ))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn json_core(sink: Arc<dyn Sink>, level: LogLevel) -> Box<dyn Core> {
        Box::new(IoCore::new(Encoder::json(EncoderConfig::default()), sink, level))
    }

    #[test]
    fn test_thresholds_are_independent() {
        let main = Arc::new(MemorySink::default());
        let errors = Arc::new(MemorySink::default());
        let tee = Tee::new(
            vec![
                json_core(main.clone(), LogLevel::Debug),
                json_core(errors.clone(), LogLevel::Error),
            ],
            Arc::new(LoggerMetrics::new()),
        );

        for level in LogLevel::ALL {
            tee.write(&LogEntry::new(level, "m"));
        }

        assert_eq!(main.lines().len(), 6);
        let error_levels: Vec<String> = errors
            .lines()
            .iter()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["level"].to_string())
            .collect();
        assert_eq!(error_levels, ["\"error\"", "\"panic\"", "\"fatal\""]);
    }

    #[test]
    fn test_write_failure_does_not_block_other_cores() {
        let good = Arc::new(MemorySink::default());
        let metrics = Arc::new(LoggerMetrics::new());
        let tee = Tee::new(
            vec![
                json_core(Arc::new(FailingSink::default()), LogLevel::Info),
                json_core(good.clone(), LogLevel::Info),
            ],
            Arc::clone(&metrics),
        );

        let fields = [Field::new("attempt", 1)];
        tee.write(&LogEntry::new(LogLevel::Info, "still here").with_fields(&[], &fields));

        assert_eq!(good.lines().len(), 1);
        assert_eq!(metrics.write_errors(), 1);
        assert_eq!(metrics.records_written(), 1);
    }

    #[test]
    fn test_sync_attempts_every_core() {
        let first = Arc::new(FailingSink::default());
        let second = Arc::new(FailingSink::default());
        let metrics = Arc::new(LoggerMetrics::new());
        let tee = Tee::new(
            vec![
                json_core(first.clone(), LogLevel::Info),
                json_core(second.clone(), LogLevel::Info),
            ],
            Arc::clone(&metrics),
        );

        let err = tee.sync().unwrap_err();
        assert!(matches!(err, LoggerError::Flush { .. }));
        assert_eq!(first.syncs.load(Ordering::SeqCst), 1);
        assert_eq!(second.syncs.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.flush_errors(), 2);
    }

    #[test]
    fn test_empty_tee_is_nop() {
        let tee = Tee::nop(Arc::new(LoggerMetrics::new()));
        assert_eq!(tee.len(), 1);
        assert_eq!(tee.core_names(), ["nop"]);
        for level in LogLevel::ALL {
            assert!(!tee.enabled(level));
        }
        tee.write(&LogEntry::new(LogLevel::Fatal, "dropped"));
        tee.sync().unwrap();
        assert_eq!(tee.metrics().records_written(), 0);
    }

    #[test]
    fn test_locked_sink_core() {
        let sink = Arc::new(LockedSink::new(Vec::new(), "vec"));
        let core = IoCore::new(Encoder::json(EncoderConfig::default()), sink, LogLevel::Warn);
        assert!(!core.enabled(LogLevel::Info));
        assert!(core.enabled(LogLevel::Warn));
        assert_eq!(core.name(), "vec");
        core.write(&LogEntry::new(LogLevel::Info, "skipped")).unwrap();
        core.sync().unwrap();
    }

    #[test]
    fn test_build_core_layout() {
        let dir = TempDir::new().unwrap();
        let config = Config::default()
            .with_filename(dir.path().join("app.log"))
            .with_error_filename(dir.path().join("error.log"))
            .with_console(false);

        let tee = build_core(&config, Arc::new(LoggerMetrics::new())).unwrap();
        assert_eq!(tee.len(), 2);
        assert!(tee.enabled(LogLevel::Info));
        assert!(!tee.enabled(LogLevel::Debug));
        assert!(dir.path().join("app.log").exists());
        assert!(dir.path().join("error.log").exists());
    }

    #[test]
    fn test_build_core_without_outputs() {
        let config = Config::default()
            .with_filename("")
            .with_error_filename("")
            .with_console(false);

        let tee = build_core(&config, Arc::new(LoggerMetrics::new())).unwrap();
        assert_eq!(tee.core_names(), ["nop"]);
    }

    #[test]
    fn test_build_core_rejects_bad_level() {
        let config = Config::default()
            .with_level("verbose")
            .with_filename("")
            .with_error_filename("")
            .with_console(false);

        let err = build_core(&config, Arc::new(LoggerMetrics::new())).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("verbose"));
    }
}
