//! 日志模块测试

mod common;

use common::{capture_logs, capture_logs_with};
use geofacts::domain::{ChatUser, EventKind, IncomingEvent};
use geofacts::logger::{self, LogConfig};

#[test]
fn test_single_event_produces_single_line() {
    let (logs, _guard) = capture_logs();

    logger::log_interaction(7, Some("bob"), "start command");

    let lines = logs.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" - test_bot - INFO - User 7 (@bob) performed action: start command"));
}

#[test]
fn test_line_starts_with_timestamp() {
    let (logs, _guard) = capture_logs();

    logger::log_interaction(7, None, "help command");

    let line = logs.lines().remove(0);
    // 2025-06-07 17:00:00 - ...
    let (timestamp, rest) = line.split_at(19);
    assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
    assert_eq!(
        rest,
        " - test_bot - INFO - User 7 (Unknown) performed action: help command"
    );
}

#[test]
fn test_api_call_levels() {
    let (logs, _guard) = capture_logs();

    logger::log_api_call("OpenAI", true, "Generated fact for coordinates 1, 2");
    logger::log_api_call("OpenAI", false, "Error: quota");
    logger::log_api_call("OpenAI", false, "");

    let lines = logs.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("INFO - API call to OpenAI: SUCCESS - Generated fact for coordinates 1, 2"));
    assert!(lines[1].ends_with("ERROR - API call to OpenAI: FAILED - Error: quota"));
    assert!(lines[2].ends_with("ERROR - API call to OpenAI: FAILED"));
}

#[test]
fn test_record_interaction_uses_event_fields() {
    let (logs, _guard) = capture_logs();

    let user = ChatUser::new(3, "Carol").with_username("carol");
    let event = IncomingEvent::new(3, user, EventKind::Help);
    logger::record_interaction(&event.interaction());

    assert!(logs.contents().contains("User 3 (@carol) performed action: help command"));
}

#[test]
fn test_span_fields_are_printed() {
    let (logs, _guard) = capture_logs();

    let span = logger::event_span(42);
    let _entered = span.enter();
    tracing::info!("inside request");

    let line = logs.lines().remove(0);
    assert!(line.contains("request_id="));
    assert!(line.contains("user_id=42"));
    assert!(line.ends_with("inside request"));
}

#[test]
fn test_target_and_file_columns() {
    let (logs, _guard) = capture_logs_with(LogConfig {
        enable_color: false,
        show_target: true,
        show_file: true,
        ..LogConfig::default()
    });

    tracing::info!("with location");

    let line = logs.lines().remove(0);
    assert!(line.contains(" - INFO - logger (tests/logger.rs:"));
    assert!(line.ends_with(") with location"));
}

#[test]
fn test_color_toggle() {
    let (plain, guard) = capture_logs();
    tracing::warn!("plain");
    drop(guard);
    assert!(plain.contents().contains(" - WARN - plain"));
    assert!(!plain.contents().contains('\x1b'));

    let (colored, _guard) = capture_logs_with(LogConfig {
        enable_color: true,
        ..LogConfig::default()
    });
    tracing::warn!("colored");
    assert!(colored.contents().contains("\x1b[33mWARN\x1b[0m - colored"));
}
