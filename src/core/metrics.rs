//! Logger metrics for observability
//!
//! Write failures on individual records are swallowed so that logging never
//! fails the caller; these counters keep them visible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use teelog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written();
/// metrics.record_write_error();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.write_errors(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records accepted by at least one core and written without error
    records_written: AtomicU64,

    /// Per-core write failures
    write_errors: AtomicU64,

    /// Flush failures, including background flushes
    flush_errors: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            flush_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_errors(&self) -> u64 {
        self.flush_errors.load(Ordering::Relaxed)
    }

    /// Record a successfully written record, returning the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a write failure, returning the previous count
    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a flush failure, returning the previous count
    #[inline]
    pub fn record_flush_error(&self) -> u64 {
        self.flush_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Get error rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no records have been processed.
    pub fn error_rate(&self) -> f64 {
        let failed = self.write_errors() as f64;
        let total = self.records_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.records_written.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        self.flush_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the `previous`-th failure should be reported on stderr
///
/// Reports the first failure and every 1000th thereafter.
#[inline]
pub(crate) fn should_alert(previous: u64) -> bool {
    previous == 0 || (previous + 1) % 1000 == 0
}
