//! Log entry structure

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::panic::Location;

/// One record offered to the cores
///
/// Borrowed from the emitting call: the facade's bound fields and the
/// call-site fields are kept as two slices, written in that order.
#[derive(Debug, Clone)]
pub struct LogEntry<'a> {
    pub level: LogLevel,
    pub message: &'a str,
    pub time: DateTime<Local>,
    pub caller: Option<&'static Location<'static>>,
    pub stacktrace: Option<String>,
    pub bound: &'a [Field],
    pub fields: &'a [Field],
}

impl<'a> LogEntry<'a> {
    pub fn new(level: LogLevel, message: &'a str) -> Self {
        Self {
            level,
            message,
            time: Local::now(),
            caller: None,
            stacktrace: None,
            bound: &[],
            fields: &[],
        }
    }

    #[must_use]
    pub fn with_caller(mut self, caller: &'static Location<'static>) -> Self {
        self.caller = Some(caller);
        self
    }

    #[must_use]
    pub fn with_stacktrace(mut self, stacktrace: String) -> Self {
        self.stacktrace = Some(stacktrace);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, bound: &'a [Field], fields: &'a [Field]) -> Self {
        self.bound = bound;
        self.fields = fields;
        self
    }

    /// Bound fields followed by call-site fields
    pub fn all_fields(&self) -> impl Iterator<Item = &'a Field> {
        self.bound.iter().chain(self.fields.iter())
    }

    pub fn has_fields(&self) -> bool {
        !self.bound.is_empty() || !self.fields.is_empty()
    }

    /// Caller as `dir/file.rs:line`
    pub fn short_caller(&self) -> Option<String> {
        self.caller.map(short_location)
    }
}

fn short_location(location: &Location<'_>) -> String {
    let file = location.file();
    let mut separators = file.rmatch_indices(|c: char| c == '/' || c == '\\');
    let short = match (separators.next(), separators.next()) {
        (Some(_), Some((idx, _))) => &file[idx + 1..],
        _ => file,
    };
    format!("{}:{}", short, location.line())
}
