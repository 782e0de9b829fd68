//! Sink that writes through the structured engine
//!
//! Info calls are written at engine level `INFO` and error calls at `ERROR`.
//! Key/value arguments are turned into fields here. Malformed arguments are
//! never an error for the caller; the sink reports them itself at `DPANIC`
//! and keeps whatever part of the list it can make sense of.

use super::config::Config;
use super::engine::EngineLogger;
use super::entry::Caller;
use super::error::Result;
use super::field::{Arg, Field, FieldValue};
use super::log_level::LogLevel;
use super::metrics::Metrics;
use super::sink::{LogSink, RuntimeInfo};
use std::error::Error;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// A [`LogSink`] backed by an [`EngineLogger`]
#[derive(Debug)]
pub struct EngineSink {
    /// Named engine without context fields
    underlying: EngineLogger,
    /// Named engine carrying the context fields
    logger: EngineLogger,
    call_depth: AtomicI32,
    err_key: String,
    max_level: i32,
    metrics: Option<Arc<Metrics>>,
}

impl EngineSink {
    pub fn new(config: &Config) -> Self {
        let logger = EngineLogger::new(config);
        if let Some(ref metrics) = config.metrics {
            metrics.init_logger(logger.name());
        }
        Self {
            underlying: logger.clone(),
            logger,
            call_depth: AtomicI32::new(0),
            err_key: config.error_key.clone(),
            max_level: config.level,
            metrics: config.metrics.clone(),
        }
    }

    /// The engine logger including context fields
    pub fn logger(&self) -> &EngineLogger {
        &self.logger
    }

    /// Call depth from `init` plus any added with `with_call_depth`
    pub fn call_depth(&self) -> i32 {
        self.call_depth.load(Ordering::Relaxed) + self.logger.caller_skip()
    }

    pub fn max_level(&self) -> i32 {
        self.max_level
    }

    fn derive(&self, underlying: EngineLogger, logger: EngineLogger) -> Self {
        Self {
            underlying,
            logger,
            call_depth: AtomicI32::new(self.call_depth.load(Ordering::Relaxed)),
            err_key: self.err_key.clone(),
            max_level: self.max_level,
            metrics: self.metrics.clone(),
        }
    }

    /// Pair up a flat key/value list
    fn sweeten(&self, kvs: &[Arg], caller: Option<Caller<'_>>) -> Vec<Field> {
        let mut fields = Vec::with_capacity(kvs.len() / 2);
        let mut i = 0;
        while i < kvs.len() {
            match &kvs[i] {
                Arg::Field(field) => {
                    self.dpanic(
                        "Strongly-typed field passed as a key",
                        &[Field::new("field", field.key.as_str())],
                        caller,
                    );
                    fields.push(field.clone());
                    i += 1;
                }
                Arg::Value(key) if i + 1 == kvs.len() => {
                    self.dpanic(
                        "Ignored key without a value.",
                        &[
                            Field::new("position", i),
                            Field::new("key", key.to_string()),
                        ],
                        caller,
                    );
                    break;
                }
                Arg::Value(FieldValue::String(key)) => {
                    fields.push(Field::new(key.as_str(), kvs[i + 1].to_value()));
                    i += 2;
                }
                Arg::Value(key) => {
                    self.dpanic(
                        "Ignored key-value pair with non-string key.",
                        &[
                            Field::new("position", i),
                            Field::new("type", key.type_name()),
                            Field::new("value", key.to_string()),
                        ],
                        caller,
                    );
                    i += 2;
                }
            }
        }
        fields
    }

    fn dpanic(&self, msg: &str, fields: &[Field], caller: Option<Caller<'_>>) {
        self.logger.log(LogLevel::DPanic, msg, caller, fields);
    }
}

impl LogSink for EngineSink {
    fn init(&self, info: RuntimeInfo) {
        self.call_depth.store(info.call_depth, Ordering::Relaxed);
    }

    fn enabled(&self, level: i32) -> bool {
        level <= self.max_level
    }

    fn info(&self, level: i32, msg: &str, kvs: &[Arg], caller: Option<Caller<'_>>) {
        if !self.enabled(level) {
            return;
        }
        let fields = self.sweeten(kvs, caller);
        self.logger.log(LogLevel::Info, msg, caller, &fields);
    }

    fn error(&self, err: Option<&dyn Error>, msg: &str, kvs: &[Arg], caller: Option<Caller<'_>>) {
        let mut fields = self.sweeten(kvs, caller);
        if let (false, Some(err)) = (self.err_key.is_empty(), err) {
            fields.push(Field::new(self.err_key.as_str(), err.to_string()));
        }
        self.logger.log(LogLevel::Error, msg, caller, &fields);
    }

    fn with_values(&self, kvs: &[Arg]) -> Arc<dyn LogSink> {
        let fields = self.sweeten(kvs, None);
        Arc::new(self.derive(self.underlying.clone(), self.logger.with(fields)))
    }

    fn with_name(&self, name: &str) -> Arc<dyn LogSink> {
        let sink = self.derive(self.underlying.named(name), self.logger.named(name));
        if let Some(ref metrics) = self.metrics {
            metrics.init_logger(sink.logger.name());
        }
        Arc::new(sink)
    }

    fn with_call_depth(&self, depth: i32) -> Arc<dyn LogSink> {
        Arc::new(self.derive(
            self.underlying.with_caller_skip(depth),
            self.logger.with_caller_skip(depth),
        ))
    }

    fn underlying(&self) -> Option<EngineLogger> {
        Some(self.underlying.clone())
    }

    fn flush(&self) -> Result<()> {
        self.logger.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::BufferAppender;
    use crate::core::config;
    use std::io;

    fn sink(extra: Vec<config::ConfigOption>) -> (EngineSink, BufferAppender) {
        let buffer = BufferAppender::new();
        let mut options = vec![config::with_appender(buffer.clone())];
        options.extend(extra);
        (EngineSink::new(&Config::with_options(&options)), buffer)
    }

    fn parsed(buffer: &BufferAppender) -> Vec<serde_json::Value> {
        buffer
            .lines()
            .iter()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect()
    }

    #[test]
    fn test_enabled_up_to_max_level() {
        let (sink, buffer) = sink(vec![config::with_level(2)]);
        assert!(sink.enabled(0));
        assert!(sink.enabled(2));
        assert!(!sink.enabled(3));

        sink.info(3, "too verbose", &[], None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_info_pairs_keys_and_values() {
        let (sink, buffer) = sink(vec![]);
        sink.info(0, "hello", &[Arg::from("user"), Arg::from("ada"), Arg::from("n"), Arg::from(3)], None);

        let lines = parsed(&buffer);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["msg"], "hello");
        assert_eq!(lines[0]["user"], "ada");
        assert_eq!(lines[0]["n"], 3);
    }

    #[test]
    fn test_error_appends_error_field() {
        let (sink, buffer) = sink(vec![]);
        let err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        sink.error(Some(&err), "open failed", &[], None);
        sink.error(None, "no error value", &[], None);

        let lines = parsed(&buffer);
        assert_eq!(lines[0]["level"], "ERROR");
        assert_eq!(lines[0]["error"], "no such file");
        assert!(lines[1].get("error").is_none());
    }

    #[test]
    fn test_empty_error_key_omits_error() {
        let (sink, buffer) = sink(vec![config::with_error_key("")]);
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        sink.error(Some(&err), "failed", &[], None);
        assert!(parsed(&buffer)[0].get("error").is_none());
    }

    #[test]
    fn test_trailing_key_is_reported_and_dropped() {
        let (sink, buffer) = sink(vec![]);
        sink.info(0, "odd", &[Arg::from("a"), Arg::from(1), Arg::from("dangling")], None);

        let lines = parsed(&buffer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "DPANIC");
        assert_eq!(lines[0]["msg"], "Ignored key without a value.");
        assert_eq!(lines[0]["position"], 2);
        assert_eq!(lines[0]["key"], "dangling");
        assert_eq!(lines[1]["a"], 1);
        assert!(lines[1].get("dangling").is_none());
    }

    #[test]
    fn test_non_string_key_drops_pair() {
        let (sink, buffer) = sink(vec![]);
        sink.info(0, "bad key", &[Arg::from(42), Arg::from("x"), Arg::from("ok"), Arg::from(true)], None);

        let lines = parsed(&buffer);
        assert_eq!(lines[0]["msg"], "Ignored key-value pair with non-string key.");
        assert_eq!(lines[0]["type"], "int");
        assert_eq!(lines[1]["ok"], true);
        assert!(lines[1].get("42").is_none());
    }

    #[test]
    fn test_field_in_key_position_is_accepted() {
        let (sink, buffer) = sink(vec![]);
        sink.info(0, "typed", &[Arg::from(Field::new("typed", 1.5)), Arg::from("k"), Arg::from("v")], None);

        let lines = parsed(&buffer);
        assert_eq!(lines[0]["level"], "DPANIC");
        assert_eq!(lines[1]["typed"], 1.5);
        assert_eq!(lines[1]["k"], "v");
    }

    #[test]
    fn test_derivations_do_not_mutate_parent() {
        let (parent, buffer) = sink(vec![config::with_name("root")]);
        let child = parent
            .with_name("child")
            .with_values(&[Arg::from("req"), Arg::from(7)]);

        parent.info(0, "from parent", &[], None);
        child.info(0, "from child", &[], None);

        let lines = parsed(&buffer);
        assert_eq!(lines[0]["logger"], "root");
        assert!(lines[0].get("req").is_none());
        assert_eq!(lines[1]["logger"], "root.child");
        assert_eq!(lines[1]["req"], 7);

        let underlying = child.underlying().expect("engine");
        assert_eq!(underlying.name(), "root.child");
        assert!(underlying.fields().is_empty());
    }

    #[test]
    fn test_call_depth_accumulates() {
        let (root, _) = sink(vec![]);
        root.init(RuntimeInfo { call_depth: 1 });
        assert_eq!(root.call_depth(), 1);

        let deeper = root.with_call_depth(2).with_call_depth(1);
        assert_eq!(deeper.underlying().expect("engine").caller_skip(), 3);

        let same = root.with_call_depth(0);
        assert_eq!(same.underlying().expect("engine").caller_skip(), 0);
    }

    #[test]
    fn test_rename_registers_metrics_series() {
        let metrics = Arc::new(Metrics::new());
        let (root, _) = sink(vec![config::with_metrics(Arc::clone(&metrics)), config::with_name("svc")]);
        assert!(metrics.has_logger("svc"));

        let child = root.with_name("db");
        assert!(metrics.has_logger("svc.db"));

        child.info(0, "query", &[], None);
        assert_eq!(metrics.lines("svc.db", LogLevel::Info), 1);
        assert!(metrics.bytes("svc.db", LogLevel::Info) > 0);
    }
}
