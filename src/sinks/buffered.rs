//! Buffering layer in front of a writer
//!
//! Bytes are held in memory and pushed to the inner writer when the buffer
//! would overflow, on [`Sink::sync`], on drop and, when a flush interval is
//! configured, from a background flusher thread.

use crate::core::error::{LoggerError, Result};
use crate::core::metrics::{should_alert, LoggerMetrics};
use crate::core::sink::Sink;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Smallest buffer the layer will use
pub const MIN_BUFFER_SIZE: usize = 4096;

/// Clamp a configured buffer size to [`MIN_BUFFER_SIZE`]
pub fn buffer_capacity(requested: usize) -> usize {
    requested.max(MIN_BUFFER_SIZE)
}

struct BufferState<W> {
    buf: Vec<u8>,
    inner: W,
}

impl<W: Write> BufferState<W> {
    /// Write out the buffer; on failure only the unwritten tail is kept
    fn drain(&mut self) -> io::Result<()> {
        let mut written = 0;
        let result = loop {
            if written == self.buf.len() {
                break Ok(());
            }
            match self.inner.write(&self.buf[written..]) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write buffered records",
                    ))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        self.buf.drain(..written);
        result
    }

    fn flush_all(&mut self) -> io::Result<()> {
        self.drain()?;
        self.inner.flush()
    }
}

struct Flusher {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Mutex-guarded buffered sink
pub struct BufferedSink<W: Write + Send + 'static> {
    name: String,
    capacity: usize,
    state: Arc<Mutex<BufferState<W>>>,
    flusher: Mutex<Option<Flusher>>,
}

impl<W: Write + Send + 'static> BufferedSink<W> {
    /// Buffer writes to `inner`, holding at least [`MIN_BUFFER_SIZE`] bytes
    pub fn new(inner: W, capacity: usize, name: impl Into<String>) -> Self {
        let capacity = buffer_capacity(capacity);
        Self {
            name: name.into(),
            capacity,
            state: Arc::new(Mutex::new(BufferState {
                buf: Vec::with_capacity(capacity),
                inner,
            })),
            flusher: Mutex::new(None),
        }
    }

    /// Buffer writes to `inner` and flush them every `interval`
    ///
    /// Failed background flushes are counted in `metrics`.
    pub fn with_flush_interval(
        inner: W,
        capacity: usize,
        interval: Duration,
        name: impl Into<String>,
        metrics: Arc<LoggerMetrics>,
    ) -> Result<Self> {
        let sink = Self::new(inner, capacity, name);
        let (stop, stopped) = bounded::<()>(1);
        let state: Weak<Mutex<BufferState<W>>> = Arc::downgrade(&sink.state);
        let sink_name = sink.name.clone();

        let handle = thread::Builder::new()
            .name("teelog-flusher".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(state) = state.upgrade() else { break };
                        let result = state.lock().flush_all();
                        if let Err(e) = result {
                            let previous = metrics.record_flush_error();
                            if should_alert(previous) {
                                eprintln!(
                                    "[LOGGER ERROR] Background flush of '{}' failed: {} ({} failures)",
                                    sink_name,
                                    e,
                                    previous + 1
                                );
                            }
                        }
                    }
                    // Stop requested or the sink is gone
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        *sink.flusher.lock() = Some(Flusher { stop, handle });
        Ok(sink)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently held in memory
    pub fn buffered(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn has_flusher(&self) -> bool {
        self.flusher.lock().is_some()
    }

    /// Stop the background flusher, if any, and wait for it to exit
    pub fn stop(&self) {
        let flusher = self.flusher.lock().take();
        if let Some(Flusher { stop, handle }) = flusher {
            let _ = stop.send(());
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Flusher thread for '{}' panicked", self.name);
            }
        }
    }
}

impl<W: Write + Send + 'static> Sink for BufferedSink<W> {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.buf.len() + buf.len() > self.capacity {
            state.drain()?;
        }
        if buf.len() >= self.capacity {
            state.inner.write_all(buf)
        } else {
            state.buf.extend_from_slice(buf);
            Ok(())
        }
    }

    fn sync(&self) -> Result<()> {
        self.state
            .lock()
            .flush_all()
            .map_err(|e| LoggerError::flush(self.name.clone(), e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<W: Write + Send + 'static> Drop for BufferedSink<W> {
    fn drop(&mut self) {
        self.stop();
        if let Err(e) = self.state.lock().flush_all() {
            eprintln!("[LOGGER ERROR] Failed to flush '{}' on drop: {}", self.name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shared in-memory writer that can be told to fail
    #[derive(Clone, Default)]
    struct MemoryWriter {
        data: Arc<Mutex<Vec<u8>>>,
        fail: Arc<std::sync::atomic::AtomicBool>,
    }

    impl MemoryWriter {
        fn contents(&self) -> Vec<u8> {
            self.data.lock().clone()
        }
    }

    impl Write for MemoryWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.data.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_capacity_is_clamped() {
        let sink = BufferedSink::new(MemoryWriter::default(), 16, "mem");
        assert_eq!(sink.capacity(), MIN_BUFFER_SIZE);

        let sink = BufferedSink::new(MemoryWriter::default(), 64 * 1024, "mem");
        assert_eq!(sink.capacity(), 64 * 1024);
    }

    #[test]
    fn test_writes_held_until_sync() {
        let writer = MemoryWriter::default();
        let sink = BufferedSink::new(writer.clone(), 8192, "mem");

        sink.write_all(b"hello\n").unwrap();
        assert!(writer.contents().is_empty());
        assert_eq!(sink.buffered(), 6);

        sink.sync().unwrap();
        assert_eq!(writer.contents(), b"hello\n");
        assert_eq!(sink.buffered(), 0);
    }

    #[test]
    fn test_flushes_when_full() {
        let writer = MemoryWriter::default();
        let sink = BufferedSink::new(writer.clone(), MIN_BUFFER_SIZE, "mem");
        let record = vec![b'x'; 1000];

        for _ in 0..5 {
            sink.write_all(&record).unwrap();
        }

        // The fifth record did not fit, so the first four were drained
        assert_eq!(writer.contents().len(), 4000);
        assert_eq!(sink.buffered(), 1000);
    }

    #[test]
    fn test_oversized_record_bypasses_buffer() {
        let writer = MemoryWriter::default();
        let sink = BufferedSink::new(writer.clone(), MIN_BUFFER_SIZE, "mem");

        sink.write_all(b"small\n").unwrap();
        sink.write_all(&vec![b'y'; MIN_BUFFER_SIZE * 2]).unwrap();

        let contents = writer.contents();
        assert!(contents.starts_with(b"small\n"));
        assert_eq!(contents.len(), 6 + MIN_BUFFER_SIZE * 2);
    }

    #[test]
    fn test_sync_reports_flush_error() {
        let writer = MemoryWriter::default();
        let sink = BufferedSink::new(writer.clone(), 8192, "mem");
        sink.write_all(b"pending\n").unwrap();

        writer.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let err = sink.sync().unwrap_err();
        assert!(matches!(err, LoggerError::Flush { .. }));

        // Nothing is lost: the bytes are written once the writer recovers
        writer.fail.store(false, std::sync::atomic::Ordering::SeqCst);
        sink.sync().unwrap();
        assert_eq!(writer.contents(), b"pending\n");
    }

    /// Writer taking four bytes per call until its budget runs out
    #[derive(Clone)]
    struct ChokingWriter {
        data: Arc<Mutex<Vec<u8>>>,
        budget: Arc<Mutex<usize>>,
    }

    impl Write for ChokingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut budget = self.budget.lock();
            if *budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(4).min(*budget);
            *budget -= n;
            self.data.lock().extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_partial_flush_keeps_only_unwritten_tail() {
        let writer = ChokingWriter {
            data: Arc::new(Mutex::new(Vec::new())),
            budget: Arc::new(Mutex::new(8)),
        };
        let sink = BufferedSink::new(writer.clone(), 8192, "mem");
        sink.write_all(b"first\nsecond\n").unwrap();

        assert!(sink.sync().is_err());
        assert_eq!(writer.data.lock().as_slice(), b"first\nse");
        assert_eq!(sink.buffered(), 5);

        *writer.budget.lock() = usize::MAX;
        sink.sync().unwrap();
        assert_eq!(writer.data.lock().as_slice(), b"first\nsecond\n");
    }

    #[test]
    fn test_background_flusher() {
        let writer = MemoryWriter::default();
        let sink = BufferedSink::with_flush_interval(
            writer.clone(),
            8192,
            Duration::from_millis(20),
            "mem",
            Arc::new(LoggerMetrics::new()),
        )
        .unwrap();
        assert!(sink.has_flusher());

        sink.write_all(b"tick\n").unwrap();
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(writer.contents(), b"tick\n");

        sink.stop();
        assert!(!sink.has_flusher());
        sink.write_all(b"after stop\n").unwrap();
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(writer.contents(), b"tick\n");
    }

    #[test]
    fn test_background_flush_errors_are_counted() {
        let writer = MemoryWriter::default();
        let metrics = Arc::new(LoggerMetrics::new());
        let sink = BufferedSink::with_flush_interval(
            writer.clone(),
            8192,
            Duration::from_millis(10),
            "mem",
            Arc::clone(&metrics),
        )
        .unwrap();

        sink.write_all(b"stuck\n").unwrap();
        writer.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(150));
        sink.stop();

        assert!(metrics.flush_errors() > 0);
        writer.fail.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    #[test]
    fn test_drop_flushes() {
        let writer = MemoryWriter::default();
        {
            let sink = BufferedSink::new(writer.clone(), 8192, "mem");
            sink.write_all(b"last words\n").unwrap();
        }
        assert_eq!(writer.contents(), b"last words\n");
    }
}
