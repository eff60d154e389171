//! Record encoders
//!
//! - Json: one object per line, used by the file cores
//! - Console: tab-separated human-readable line with a colored level
//!
//! Fields are written in order without de-duplication. When a key repeats,
//! JSON readers keep the value written last, which is the one bound last.

use super::field::Field;
use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;
use colored::Colorize;
use serde::Serialize;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const MESSAGE_KEY: &str = "msg";
pub const CALLER_KEY: &str = "caller";
pub const STACKTRACE_KEY: &str = "stacktrace";

/// Formatting options shared by every core of one logger
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub timestamp_format: TimestampFormat,
    pub include_caller: bool,
    pub include_stacktrace: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            include_caller: true,
            include_stacktrace: true,
        }
    }
}

/// Output encoding of a core
#[derive(Debug, Clone)]
pub enum Encoder {
    Json(EncoderConfig),
    Console { config: EncoderConfig, colors: bool },
}

impl Encoder {
    pub fn json(config: EncoderConfig) -> Self {
        Encoder::Json(config)
    }

    pub fn console(config: EncoderConfig, colors: bool) -> Self {
        Encoder::Console { config, colors }
    }

    pub fn config(&self) -> &EncoderConfig {
        match self {
            Encoder::Json(config) | Encoder::Console { config, .. } => config,
        }
    }

    /// Append one encoded line, including its trailing newline, to `buf`
    pub fn encode(&self, entry: &LogEntry<'_>, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            Encoder::Json(config) => encode_json(config, entry, buf),
            Encoder::Console { config, colors } => encode_console(config, *colors, entry, buf),
        }
    }
}

fn encode_json(config: &EncoderConfig, entry: &LogEntry<'_>, buf: &mut Vec<u8>) -> serde_json::Result<()> {
    buf.push(b'{');
    write_pair(buf, LEVEL_KEY, entry.level.as_str())?;

    buf.push(b',');
    match config.timestamp_format.numeric(&entry.time) {
        Some(n) => write_pair(buf, TIME_KEY, &n)?,
        None => write_pair(buf, TIME_KEY, &config.timestamp_format.format(&entry.time))?,
    }

    if config.include_caller {
        if let Some(caller) = entry.short_caller() {
            buf.push(b',');
            write_pair(buf, CALLER_KEY, &caller)?;
        }
    }

    buf.push(b',');
    write_pair(buf, MESSAGE_KEY, entry.message)?;

    for field in entry.all_fields() {
        buf.push(b',');
        write_field(buf, field, &config.timestamp_format)?;
    }

    if config.include_stacktrace {
        if let Some(ref stack) = entry.stacktrace {
            buf.push(b',');
            write_pair(buf, STACKTRACE_KEY, stack)?;
        }
    }

    buf.extend_from_slice(b"}\n");
    Ok(())
}

fn encode_console(
    config: &EncoderConfig,
    colors: bool,
    entry: &LogEntry<'_>,
    buf: &mut Vec<u8>,
) -> serde_json::Result<()> {
    let level_str = if colors {
        entry.level.to_str().color(entry.level.color_code()).to_string()
    } else {
        entry.level.to_str().to_string()
    };

    let mut line = format!(
        "{}\t{}",
        config.timestamp_format.format(&entry.time),
        level_str
    );

    if config.include_caller {
        if let Some(caller) = entry.short_caller() {
            line.push('\t');
            line.push_str(&caller);
        }
    }

    line.push('\t');
    line.push_str(&sanitize_message(entry.message));
    buf.extend_from_slice(line.as_bytes());

    if entry.has_fields() {
        buf.extend_from_slice(b"\t{");
        for (idx, field) in entry.all_fields().enumerate() {
            if idx > 0 {
                buf.push(b',');
            }
            write_field(buf, field, &config.timestamp_format)?;
        }
        buf.push(b'}');
    }
    buf.push(b'\n');

    if config.include_stacktrace {
        if let Some(ref stack) = entry.stacktrace {
            buf.extend_from_slice(stack.trim_end().as_bytes());
            buf.push(b'\n');
        }
    }
    Ok(())
}

/// Escape line breaks so a console message stays on one line
fn sanitize_message(message: &str) -> String {
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn write_pair<V: Serialize + ?Sized>(buf: &mut Vec<u8>, key: &str, value: &V) -> serde_json::Result<()> {
    serde_json::to_writer(&mut *buf, key)?;
    buf.push(b':');
    serde_json::to_writer(&mut *buf, value)
}

fn write_field(buf: &mut Vec<u8>, field: &Field, time_format: &TimestampFormat) -> serde_json::Result<()> {
    write_pair(buf, &field.key, &field.value.to_json_value(time_format))
}
