//! Logger facade
//!
//! [`Logger`] is the handle application code logs through. It carries a sink
//! and a verbosity level and adds nothing else: formatting, filtering by
//! level and I/O all happen in the sink.
//!
//! Info entries are leveled by verbosity (`V`): 0 is always interesting,
//! higher numbers are progressively chattier. Error entries have no level.

use super::config::{Config, ConfigOption};
use super::engine_sink::EngineSink;
use super::entry::Caller;
use super::error::Result;
use super::field::Arg;
use super::sink::{discard, LogSink, RuntimeInfo};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    level: i32,
}

impl Logger {
    /// Build a logger on `sink`, telling it about the facade's frame
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        sink.init(RuntimeInfo { call_depth: 1 });
        Self { sink, level: 0 }
    }

    /// A logger that drops everything
    pub fn discard() -> Self {
        Self::new(discard())
    }

    /// A logger `level` steps more verbose than this one
    #[must_use]
    pub fn v(&self, level: i32) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            level: self.level + level,
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Whether info entries from this logger would be written
    pub fn enabled(&self) -> bool {
        self.sink.enabled(self.level)
    }

    #[track_caller]
    pub fn info(&self, msg: &str, kvs: &[Arg]) {
        self.info_at(Caller::here(), msg, kvs)
    }

    /// Log an info entry on behalf of `caller`
    pub fn info_at(&self, caller: Caller<'_>, msg: &str, kvs: &[Arg]) {
        if self.enabled() {
            self.sink.info(self.level, msg, kvs, Some(caller));
        }
    }

    #[track_caller]
    pub fn error(&self, err: Option<&dyn Error>, msg: &str, kvs: &[Arg]) {
        self.error_at(Caller::here(), err, msg, kvs)
    }

    /// Log an error entry on behalf of `caller`
    pub fn error_at(&self, caller: Caller<'_>, err: Option<&dyn Error>, msg: &str, kvs: &[Arg]) {
        self.sink.error(err, msg, kvs, Some(caller));
    }

    /// A logger that adds `kvs` to every entry
    #[must_use]
    pub fn with_values(&self, kvs: &[Arg]) -> Self {
        self.derive(self.sink.with_values(kvs))
    }

    /// A logger with `name` appended to its name
    #[must_use]
    pub fn with_name(&self, name: &str) -> Self {
        self.derive(self.sink.with_name(name))
    }

    /// A logger for helpers that log on behalf of their own caller
    #[must_use]
    pub fn with_call_depth(&self, depth: i32) -> Self {
        self.derive(self.sink.with_call_depth(depth))
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    fn derive(&self, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            level: self.level,
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::discard()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Build a logger writing through the engine configured by `options`
///
/// The engine sink is returned as well, for callers that need direct access
/// to it (to flush on shutdown, or to attach it to a [`LazySink`](crate::LazySink)).
pub fn new_logger(options: &[ConfigOption]) -> (Logger, Arc<EngineSink>) {
    let config = Config::with_options(options);
    let sink = Arc::new(EngineSink::new(&config));
    (Logger::new(sink.clone()), sink)
}
