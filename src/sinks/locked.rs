//! Unbuffered sink serializing writes with a mutex

use crate::core::error::{LoggerError, Result};
use crate::core::sink::Sink;
use parking_lot::Mutex;
use std::io::{self, Write};

pub struct LockedSink<W: Write + Send> {
    name: String,
    inner: Mutex<W>,
}

impl<W: Write + Send> LockedSink<W> {
    pub fn new(inner: W, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(inner),
        }
    }
}

impl<W: Write + Send> Sink for LockedSink<W> {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        self.inner.lock().write_all(buf)
    }

    fn sync(&self) -> Result<()> {
        self.inner
            .lock()
            .flush()
            .map_err(|e| LoggerError::flush(self.name.clone(), e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
