//! Property-based tests for teelog using proptest

use proptest::prelude::*;
use teelog::prelude::*;
use teelog::{Encoder, EncoderConfig, LogEntry};

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Panic),
        Just(LogLevel::Fatal),
    ]
}

fn field_batch() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[a-z_]{1,8}", any::<i64>()), 0..6)
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back regardless of case and padding
    #[test]
    fn test_log_level_name_roundtrip(level in any_level(), upper in any::<bool>(), pad in " {0,3}") {
        let name = if upper { level.to_str().to_string() } else { level.as_str().to_string() };
        let input = format!("{}{}{}", pad, name, pad);
        let parsed: std::result::Result<LogLevel, String> = input.parse();
        prop_assert_eq!(parsed, Ok(level));
    }

    /// Level ordering follows severity
    #[test]
    fn test_log_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, (a as u8) <= (b as u8));
        prop_assert_eq!(a.wants_stacktrace(), a >= LogLevel::Error);
    }

    /// Unknown names never parse
    #[test]
    fn test_log_level_rejects_unknown(name in "[a-z]{1,10}") {
        let known = ["debug", "info", "warn", "warning", "error", "panic", "fatal"];
        prop_assume!(!known.contains(&name.as_str()));
        prop_assert!(name.parse::<LogLevel>().is_err());
    }
}

// ============================================================================
// Context Tests
// ============================================================================

proptest! {
    /// Attaching appends in order and leaves the parent as it was
    #[test]
    fn test_context_attach_appends(first in field_batch(), second in field_batch()) {
        let parent = store_fields(None, first.clone());
        let child = store_fields(Some(&parent), second.clone());

        prop_assert_eq!(fields_from_context(Some(&parent)).len(), first.len());
        prop_assert_eq!(fields_from_context(Some(&child)).len(), first.len() + second.len());

        let expected: Vec<Field> = first.iter().chain(second.iter()).cloned().map(Field::from).collect();
        prop_assert_eq!(fields_from_context(Some(&child)), expected.as_slice());
    }

    /// Siblings derived from one parent never see each other's fields
    #[test]
    fn test_context_siblings_isolated(base in field_batch(), left in field_batch(), right in field_batch()) {
        let parent = store_fields(None, base.clone());
        let a = store_fields(Some(&parent), left.clone());
        let b = store_fields(Some(&parent), right.clone());

        prop_assert_eq!(a.fields().len(), base.len() + left.len());
        prop_assert_eq!(b.fields().len(), base.len() + right.len());
        prop_assert_eq!(&a.fields()[..base.len()], parent.fields());
        prop_assert_eq!(&b.fields()[..base.len()], parent.fields());
    }
}

// ============================================================================
// Logger Derivation Tests
// ============================================================================

proptest! {
    /// Derived loggers carry parent fields followed by the new ones
    #[test]
    fn test_derived_fields_concatenate(first in field_batch(), second in field_batch()) {
        let parent = Logger::nop().with_fields(first.clone());
        let child = parent.with_fields(second.clone());

        prop_assert_eq!(parent.fields().len(), first.len());
        prop_assert_eq!(child.fields().len(), first.len() + second.len());
        prop_assert_eq!(&child.fields()[..first.len()], parent.fields());
    }
}

// ============================================================================
// Config Tests
// ============================================================================

proptest! {
    /// Default merging is idempotent and never leaves a zero where a default exists
    #[test]
    fn test_merge_idempotent(
        max_size in 0u64..500,
        max_backups in 0usize..20,
        max_age in 0u64..90,
        buffer_size in 0usize..1_000_000,
        async_flush_interval in 0u64..5000,
        level in prop_oneof![Just(String::new()), Just("debug".to_string()), Just("error".to_string())],
    ) {
        let config = Config {
            level,
            max_size,
            max_backups,
            max_age,
            buffer_size,
            async_flush_interval,
            ..Config::default()
        };

        let once = config.clone().merged_with_defaults();
        prop_assert_eq!(once.clone().merged_with_defaults(), once.clone());
        prop_assert!(once.max_size > 0 && once.max_backups > 0 && once.max_age > 0);
        prop_assert!(once.buffer_size > 0 && once.async_flush_interval > 0);
        prop_assert!(!once.level.is_empty());
        if max_size > 0 {
            prop_assert_eq!(once.max_size, max_size);
        }
    }
}

// ============================================================================
// Encoder Tests
// ============================================================================

proptest! {
    /// Any message encodes to exactly one JSON line that reads back unchanged
    #[test]
    fn test_json_line_per_record(message in ".*", level in any_level()) {
        let entry = LogEntry::new(level, &message);
        let mut buf = Vec::new();
        Encoder::json(EncoderConfig::default()).encode(&entry, &mut buf).unwrap();

        let line = String::from_utf8(buf).unwrap();
        prop_assert!(line.ends_with('\n'));
        prop_assert_eq!(line.matches('\n').count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        prop_assert_eq!(parsed["msg"].as_str(), Some(message.as_str()));
        prop_assert_eq!(parsed["level"].as_str(), Some(level.as_str()));
    }

    /// Console lines never contain raw line breaks from the message
    #[test]
    fn test_console_single_line(message in ".*") {
        let entry = LogEntry::new(LogLevel::Info, &message);
        let mut buf = Vec::new();
        Encoder::console(EncoderConfig::default(), false).encode(&entry, &mut buf).unwrap();

        let line = String::from_utf8(buf).unwrap();
        prop_assert_eq!(line.matches('\n').count(), 1);
        prop_assert!(!line.contains('\r'));
    }
}
