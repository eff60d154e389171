//! Sink trait for log output destinations

use super::error::Result;
use std::io;

/// A durable destination for encoded records
///
/// Methods take `&self`: implementations serialize access internally so one
/// sink can be shared by every logger derived from the same configuration.
pub trait Sink: Send + Sync {
    /// Write one complete encoded record
    fn write_all(&self, buf: &[u8]) -> io::Result<()>;

    /// Push buffered bytes to the destination
    fn sync(&self) -> Result<()>;

    fn name(&self) -> &str;
}
