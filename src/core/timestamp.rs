//! Timestamp formatting utilities
//!
//! Resolves the textual `time_format` configuration value into a
//! [`TimestampFormat`]. Named layouts cover the common cases. A layout
//! without `%` is read as a Go reference layout (`2006-01-02 15:04:05`) and
//! translated; anything else is a strftime layout. Both are validated up
//! front, so a bad layout fails logger construction instead of every log call.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, TimeZone};
use std::fmt;

/// Strftime spelling of the default layout (RFC 3339 with nanoseconds)
pub const RFC3339_NANO_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

/// Go reference layout elements and their strftime spelling, longest first
const GO_LAYOUT_ELEMENTS: &[(&str, &str)] = &[
    (".000000000", "%.9f"),
    (".000000", "%.6f"),
    (".000", "%.3f"),
    ("Z07:00", "%:z"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("January", "%B"),
    ("Monday", "%A"),
    ("2006", "%Y"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("01", "%m"),
    ("02", "%d"),
    ("15", "%H"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("PM", "%p"),
];

/// Translate a Go reference layout into strftime
///
/// Returns `None` when the layout contains no reference element.
fn translate_go_layout(layout: &str) -> Option<String> {
    let mut out = String::with_capacity(layout.len() + 8);
    let mut rest = layout;
    let mut translated = false;
    'scan: while let Some(ch) = rest.chars().next() {
        for &(element, strftime) in GO_LAYOUT_ELEMENTS {
            if let Some(tail) = rest.strip_prefix(element) {
                out.push_str(strftime);
                rest = tail;
                translated = true;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    translated.then_some(out)
}

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use teelog::TimestampFormat;
///
/// let format = TimestampFormat::from_layout("unix_millis").unwrap();
/// assert!(format.is_numeric());
///
/// let custom = TimestampFormat::from_layout("%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(custom, TimestampFormat::Custom("%Y-%m-%d %H:%M:%S".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789+00:00`
    #[default]
    Rfc3339Nano,

    /// RFC 3339 with whole seconds: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123+00:00`
    Iso8601,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Resolve a configured layout string.
    ///
    /// An empty layout yields the default. Unknown strftime specifiers and
    /// layouts that render no date or time component are rejected with a
    /// configuration error.
    pub fn from_layout(layout: &str) -> Result<Self> {
        let format = match layout.trim().to_lowercase().as_str() {
            "" | "rfc3339nano" => TimestampFormat::Rfc3339Nano,
            "rfc3339" => TimestampFormat::Rfc3339,
            "iso8601" => TimestampFormat::Iso8601,
            "unix" => TimestampFormat::Unix,
            "unix_millis" => TimestampFormat::UnixMillis,
            "unix_micros" => TimestampFormat::UnixMicros,
            _ if layout == RFC3339_NANO_LAYOUT => TimestampFormat::Rfc3339Nano,
            _ => {
                let strftime = if layout.contains('%') {
                    layout.to_string()
                } else {
                    translate_go_layout(layout).ok_or_else(|| {
                        LoggerError::config(
                            "time_format",
                            format!("layout '{}' has no date or time fields", layout),
                        )
                    })?
                };
                validate_strftime(&strftime)?;
                TimestampFormat::Custom(strftime)
            }
        };
        Ok(format)
    }

    /// Format a timestamp according to this format
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            TimestampFormat::Rfc3339Nano => datetime.to_rfc3339_opts(SecondsFormat::Nanos, false),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, false),
            TimestampFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, false),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Numeric value for JSON output, `None` for textual formats
    pub fn numeric<Tz: TimeZone>(&self, datetime: &DateTime<Tz>) -> Option<i64> {
        match self {
            TimestampFormat::Unix => Some(datetime.timestamp()),
            TimestampFormat::UnixMillis => Some(datetime.timestamp_millis()),
            TimestampFormat::UnixMicros => Some(datetime.timestamp_micros()),
            _ => None,
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}

fn validate_strftime(layout: &str) -> Result<()> {
    let mut has_field = false;
    for item in StrftimeItems::new(layout) {
        match item {
            Item::Error => {
                return Err(LoggerError::config(
                    "time_format",
                    format!("invalid strftime layout '{}'", layout),
                ))
            }
            Item::Numeric(..) | Item::Fixed(_) => has_field = true,
            _ => {}
        }
    }
    if has_field {
        Ok(())
    } else {
        Err(LoggerError::config(
            "time_format",
            format!("layout '{}' has no date or time fields", layout),
        ))
    }
}
