//! Structured key/value fields
//!
//! Values form a closed set of variants built explicitly by the caller, so
//! encoders never need to inspect types at runtime.

use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Rendered error message
    Error(String),
    Time(DateTime<Local>),
    Duration(Duration),
    /// Fallback for anything else that implements `Display`
    Display(String),
}

impl FieldValue {
    /// Convert to a JSON value, rendering times with `time_format`
    #[must_use]
    pub fn to_json_value(&self, time_format: &TimestampFormat) -> Value {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) | FieldValue::Display(s) => {
                Value::String(s.clone())
            }
            FieldValue::Int(i) => Value::Number((*i).into()),
            FieldValue::Uint(u) => Value::Number((*u).into()),
            FieldValue::Float(f) => float_to_json(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Time(t) => match time_format.numeric(t) {
                Some(n) => Value::Number(n.into()),
                None => Value::String(time_format.format(t)),
            },
            FieldValue::Duration(d) => float_to_json(d.as_secs_f64()),
        }
    }
}

fn float_to_json(f: f64) -> Value {
    match serde_json::Number::from_f64(f) {
        Some(n) => Value::Number(n),
        None if f.is_nan() => Value::String("NaN".to_string()),
        None if f.is_sign_positive() => Value::String("+Inf".to_string()),
        None => Value::String("-Inf".to_string()),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) | FieldValue::Display(s) => {
                f.write_str(s)
            }
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Time(t) => write!(f, "{}", t.to_rfc3339()),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u64::from(u))
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<DateTime<Local>> for FieldValue {
    fn from(t: DateTime<Local>) -> Self {
        FieldValue::Time(t)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

/// A key/value pair attached to a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    /// Error field, always keyed `"error"`
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Local>) -> Self {
        Self::new(key, FieldValue::Time(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    pub fn display(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(key, FieldValue::Display(value.to_string()))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_constructors() {
        assert_eq!(Field::new("user_id", 123).value, FieldValue::Int(123));
        assert_eq!(Field::new("name", "alice").value, FieldValue::String("alice".into()));
        assert_eq!(Field::uint("bytes", 42).value, FieldValue::Uint(42));
        assert_eq!(Field::display("addr", "10.0.0.1:80").value, FieldValue::Display("10.0.0.1:80".into()));
    }

    #[test]
    fn test_error_field_key() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let field = Field::error(&io_err);
        assert_eq!(field.key, "error");
        assert_eq!(field.value, FieldValue::Error("missing file".into()));
    }

    #[test]
    fn test_json_values() {
        let tf = TimestampFormat::default();
        assert_eq!(FieldValue::Int(-3).to_json_value(&tf), serde_json::json!(-3));
        assert_eq!(FieldValue::Bool(true).to_json_value(&tf), serde_json::json!(true));
        assert_eq!(
            FieldValue::Duration(Duration::from_millis(1500)).to_json_value(&tf),
            serde_json::json!(1.5)
        );
        assert_eq!(FieldValue::Float(f64::NAN).to_json_value(&tf), serde_json::json!("NaN"));
        assert_eq!(
            FieldValue::Float(f64::NEG_INFINITY).to_json_value(&tf),
            serde_json::json!("-Inf")
        );
    }

    #[test]
    fn test_time_value_follows_format() {
        let now = Local::now();
        let value = FieldValue::Time(now).to_json_value(&TimestampFormat::Unix);
        assert_eq!(value, serde_json::json!(now.timestamp()));
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::new("k", "v").to_string(), "k=v");
        assert_eq!(Field::from(("count", 5)).to_string(), "count=5");
    }
}
