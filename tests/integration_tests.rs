//! Integration tests for the logging facade
//!
//! These tests verify:
//! - JSON and console output written through file and buffer appenders
//! - Log injection prevention
//! - Option weighting across presets and single settings
//! - Metrics collection
//! - Custom encoders selected by name
//! - Adapters for `io::Write` and the `log` crate

use rust_logsink::appenders::{BufferAppender, FileAppender};
use rust_logsink::core::config::{self, Config};
use rust_logsink::core::encoding::{self, Named, TimeEncoder, TimeFormat};
use rust_logsink::core::metrics::Metrics;
use rust_logsink::{info, kvs, new_logger, Field, LogLevel, LogSink, StdLogWriter};
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn json_lines(buffer: &BufferAppender) -> Vec<serde_json::Value> {
    buffer
        .lines()
        .iter()
        .map(|l| serde_json::from_str(l).expect("Each line should be a JSON object"))
        .collect()
}

#[test]
fn test_json_lines_to_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let (logger, sink) = new_logger(&[config::with_appender(appender), config::with_name("app")]);

    logger.info("started", &kvs!["port", 8080]);
    logger
        .with_name("db")
        .with_values(&kvs!["pool", "main"])
        .info("connected", &[]);
    sink.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["logger"], "app");
    assert_eq!(lines[0]["port"], 8080);
    assert!(lines[0]["caller"]
        .as_str()
        .expect("caller string")
        .starts_with("tests/integration_tests.rs:"));
    assert_eq!(lines[1]["logger"], "app.db");
    assert_eq!(lines[1]["pool"], "main");
}

#[test]
fn test_log_injection_prevention() {
    let buffer = BufferAppender::new();
    let (logger, _) = new_logger(&[config::with_appender(buffer.clone())]);

    let malicious_message = "User login\n{\"level\":\"ERROR\",\"msg\":\"fake\"}\nINFO Continuation";
    logger.info(malicious_message, &kvs!["user\nname", "a\"b"]);

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    let line: serde_json::Value = serde_json::from_str(&lines[0]).expect("json line");
    assert_eq!(line["msg"], malicious_message);
    assert_eq!(line["user\nname"], "a\"b");
}

#[test]
fn test_development_preset_with_overrides() {
    let buffer = BufferAppender::new();
    let (logger, _) = new_logger(&[
        config::with_appender(buffer.clone()),
        config::with_level(0),
        config::with_development_options(),
        config::with_level_encoder(encoding::LevelFormat::Upper),
        config::with_time_key(""),
    ]);

    logger.v(1).info("hidden by level override", &[]);
    info!(logger, "visible"; "took" => Duration::from_millis(1500));

    let contents = buffer.contents();
    assert!(!contents.contains("hidden"));
    let fields: Vec<&str> = contents.trim_end().split('\t').collect();
    assert_eq!(fields[0], "INFO");
    assert!(fields[1].starts_with("tests/integration_tests.rs:"));
    assert_eq!(fields[2], module_path!());
    assert_eq!(fields[3], "visible");
    assert_eq!(fields[4], "{\"took\":\"1.5s\"}");
}

#[test]
fn test_error_entries_with_stacktrace() {
    let buffer = BufferAppender::new();
    let (logger, _) = new_logger(&[
        config::with_appender(buffer.clone()),
        config::with_stacktrace_enabled(true),
        config::with_error_key("err"),
    ]);

    let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only filesystem");
    logger.error(Some(&err), "write failed", &kvs!["path", "/var/data"]);

    let lines = json_lines(&buffer);
    assert_eq!(lines[0]["level"], "ERROR");
    assert_eq!(lines[0]["err"], "read-only filesystem");
    assert_eq!(lines[0]["path"], "/var/data");
    assert!(lines[0]["stacktrace"].is_string());
}

#[test]
fn test_metrics_collection() {
    let metrics = Arc::new(Metrics::new());
    let buffer = BufferAppender::new();
    let (logger, _) = new_logger(&[
        config::with_appender(buffer.clone()),
        config::with_metrics(Arc::clone(&metrics)),
        config::with_name("svc"),
    ]);

    logger.info("one", &[]);
    logger.info("two", &[]);
    logger.error(None, "three", &[]);
    logger.with_name("child").info("four", &[]);

    assert_eq!(metrics.lines("svc", LogLevel::Info), 2);
    assert_eq!(metrics.lines("svc", LogLevel::Error), 1);
    assert_eq!(metrics.lines("svc.child", LogLevel::Info), 1);
    assert_eq!(metrics.encoder_errors("svc"), 0);

    let written: u64 = buffer.lines().iter().map(|l| l.len() as u64 + 1).sum();
    let counted = metrics.bytes("svc", LogLevel::Info)
        + metrics.bytes("svc", LogLevel::Error)
        + metrics.bytes("svc.child", LogLevel::Info);
    assert_eq!(written, counted);
}

#[derive(Debug)]
struct WeekdayTime;

impl Named for WeekdayTime {
    fn name(&self) -> &str {
        "weekday-integration"
    }
}

impl TimeEncoder for WeekdayTime {
    fn encode(&self, time: &chrono::DateTime<chrono::Utc>) -> serde_json::Value {
        serde_json::Value::String(time.format("%A").to_string())
    }
}

#[test]
fn test_custom_encoder_by_name() {
    encoding::register_time_encoder(Arc::new(WeekdayTime)).expect("first registration");
    let err = encoding::register_time_encoder(Arc::new(WeekdayTime))
        .expect_err("second registration must fail");
    assert!(err.to_string().contains("weekday-integration"));

    let buffer = BufferAppender::new();
    let encoder = encoding::time_encoders()
        .lookup("weekday-integration")
        .expect("registered");
    let (logger, _) = new_logger(&[config::with_appender(buffer.clone()), config::with_time_encoder(encoder)]);
    logger.info("m", &[]);

    let time = json_lines(&buffer)[0]["time"]
        .as_str()
        .expect("time string")
        .to_string();
    assert!(time.ends_with("day"));
}

#[test]
fn test_custom_layout_time_encoder() {
    let buffer = BufferAppender::new();
    let (logger, _) = new_logger(&[
        config::with_appender(buffer.clone()),
        config::with_time_encoder(TimeFormat::Layout {
            name: "year-only".to_string(),
            layout: "%Y".to_string(),
        }),
    ]);
    logger.info("m", &[]);
    let time = json_lines(&buffer)[0]["time"].as_str().expect("time").to_string();
    assert_eq!(time.len(), 4);
}

#[test]
fn test_option_weights() {
    let config = Config::with_options(&[
        config::with_level(1),
        config::with_development_options(),
        config::with_level(5),
    ]);
    assert_eq!(config.level, 5);

    let config = Config::with_options(&[config::with_name("a"), config::with_name("b")]);
    assert_eq!(config.name, "b");
}

#[test]
fn test_std_writer_adapter() {
    let buffer = BufferAppender::new();
    let (_, sink) = new_logger(&[config::with_appender(buffer.clone())]);
    let sink: Arc<dyn LogSink> = sink;

    let mut info = StdLogWriter::info(&sink);
    let mut error = StdLogWriter::error(&sink);
    writeln!(info, "legacy info").expect("write");
    writeln!(error, "legacy error").expect("write");

    let lines = json_lines(&buffer);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["msg"], "legacy info");
    assert_eq!(lines[1]["level"], "ERROR");
}

#[test]
fn test_typed_field_in_argument_list() {
    let buffer = BufferAppender::new();
    let (logger, _) = new_logger(&[config::with_appender(buffer.clone())]);

    logger.info("typed", &kvs![Field::new("ratio", 0.5), "k", "v"]);

    let lines = json_lines(&buffer);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["level"], "DPANIC");
    assert_eq!(lines[1]["ratio"], 0.5);
    assert_eq!(lines[1]["k"], "v");
}
