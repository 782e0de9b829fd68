//! Logger metrics for observability
//!
//! [`Metrics`] counts encoded lines and bytes per logger name and level, and
//! encoding failures per logger name. Counts are kept in process so they can
//! be inspected directly, and every increment is also forwarded to the
//! `metrics` facade so an installed recorder (Prometheus or otherwise) sees
//! the same series:
//!
//! | series | labels |
//! | --- | --- |
//! | `log_lines_total` | `name`, `level` |
//! | `log_bytes_total` | `name`, `level` |
//! | `log_encoder_errors_total` | `name` |
//!
//! # Example
//!
//! ```
//! use rust_logsink::core::metrics::Metrics;
//! use rust_logsink::LogLevel;
//!
//! let metrics = Metrics::new();
//! metrics.record_line("api", LogLevel::Info, 42);
//! assert_eq!(metrics.lines("api", LogLevel::Info), 1);
//! assert_eq!(metrics.bytes("api", LogLevel::Info), 42);
//! ```

use super::encoder::Encoder;
use super::entry::Entry;
use super::error::Result;
use super::field::Field;
use super::log_level::LogLevel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const LINES_TOTAL: &str = "log_lines_total";
pub const BYTES_TOTAL: &str = "log_bytes_total";
pub const ENCODER_ERRORS_TOTAL: &str = "log_encoder_errors_total";

#[derive(Debug, Default)]
struct LineCounts {
    lines: AtomicU64,
    bytes: AtomicU64,
}

/// Line, byte and encoder error counters keyed by logger name
#[derive(Debug, Default)]
pub struct Metrics {
    lines: RwLock<HashMap<(String, LogLevel), Arc<LineCounts>>>,
    errors: RwLock<HashMap<String, Arc<AtomicU64>>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach descriptions to the exported series
    pub fn describe() {
        metrics::describe_counter!(LINES_TOTAL, "Number of log lines written");
        metrics::describe_counter!(
            BYTES_TOTAL,
            metrics::Unit::Bytes,
            "Number of bytes of encoded log lines"
        );
        metrics::describe_counter!(
            ENCODER_ERRORS_TOTAL,
            "Number of log entries that could not be encoded"
        );
    }

    /// Make the series of a logger name exist before anything is logged
    pub fn init_logger(&self, name: &str) {
        for level in [LogLevel::Info, LogLevel::Error] {
            self.line_counts(name, level);
            metrics::counter!(LINES_TOTAL, "name" => name.to_string(), "level" => level.to_lowercase_str())
                .absolute(self.lines(name, level));
            metrics::counter!(BYTES_TOTAL, "name" => name.to_string(), "level" => level.to_lowercase_str())
                .absolute(self.bytes(name, level));
        }
        let errors = self.error_count(name).load(Ordering::Relaxed);
        metrics::counter!(ENCODER_ERRORS_TOTAL, "name" => name.to_string()).absolute(errors);
    }

    /// Record one successfully encoded line of `bytes` bytes
    pub fn record_line(&self, name: &str, level: LogLevel, bytes: usize) {
        let bytes = bytes as u64;
        let counts = self.line_counts(name, level);
        counts.lines.fetch_add(1, Ordering::Relaxed);
        counts.bytes.fetch_add(bytes, Ordering::Relaxed);

        metrics::counter!(LINES_TOTAL, "name" => name.to_string(), "level" => level.to_lowercase_str())
            .increment(1);
        metrics::counter!(BYTES_TOTAL, "name" => name.to_string(), "level" => level.to_lowercase_str())
            .increment(bytes);
    }

    /// Record an entry that failed to encode
    pub fn record_encoder_error(&self, name: &str) {
        self.error_count(name).fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ENCODER_ERRORS_TOTAL, "name" => name.to_string()).increment(1);
    }

    pub fn lines(&self, name: &str, level: LogLevel) -> u64 {
        self.lines
            .read()
            .get(&(name.to_string(), level))
            .map_or(0, |c| c.lines.load(Ordering::Relaxed))
    }

    pub fn bytes(&self, name: &str, level: LogLevel) -> u64 {
        self.lines
            .read()
            .get(&(name.to_string(), level))
            .map_or(0, |c| c.bytes.load(Ordering::Relaxed))
    }

    pub fn encoder_errors(&self, name: &str) -> u64 {
        self.errors
            .read()
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Whether any series exists for `name`
    pub fn has_logger(&self, name: &str) -> bool {
        self.errors.read().contains_key(name)
            || self.lines.read().keys().any(|(n, _)| n == name)
    }

    fn line_counts(&self, name: &str, level: LogLevel) -> Arc<LineCounts> {
        let key = (name.to_string(), level);
        if let Some(counts) = self.lines.read().get(&key) {
            return Arc::clone(counts);
        }
        Arc::clone(self.lines.write().entry(key).or_default())
    }

    fn error_count(&self, name: &str) -> Arc<AtomicU64> {
        if let Some(count) = self.errors.read().get(name) {
            return Arc::clone(count);
        }
        Arc::clone(self.errors.write().entry(name.to_string()).or_default())
    }
}

/// Entry encoder that reports every outcome to a [`Metrics`] collector
pub struct MetricsEncoder {
    inner: Box<dyn Encoder>,
    metrics: Arc<Metrics>,
}

impl MetricsEncoder {
    pub fn new(inner: Box<dyn Encoder>, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }
}

impl Encoder for MetricsEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        match self.inner.encode_entry(entry, fields) {
            Ok(buf) => {
                self.metrics
                    .record_line(&entry.logger_name, entry.level, buf.len());
                Ok(buf)
            }
            Err(e) => {
                self.metrics.record_encoder_error(&entry.logger_name);
                Err(e)
            }
        }
    }
}
