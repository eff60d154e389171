//! Lookups before initialization, in their own process

use teelog::{close, from_context, get_logger, try_get_logger, Context, LogLevel};

#[test]
#[should_panic(expected = "logger not initialized")]
fn test_get_logger_before_init_panics() {
    get_logger();
}

#[test]
fn test_from_context_falls_back_to_nop() {
    let logger = from_context(&Context::new());
    assert!(!logger.enabled(LogLevel::Fatal));
    logger.error("goes nowhere", &[]);
}

#[test]
fn test_non_panicking_lookups() {
    assert!(try_get_logger().is_none());
    close().expect("Closing an uninstalled logger is a no-op");
}
