//! Adapters for code that logs through other interfaces
//!
//! - [`StdLogWriter`] is an `io::Write` that turns every write into one
//!   entry, for libraries that only accept a writer.
//! - [`LogBridge`] implements [`log::Log`] so records from the `log` crate
//!   end up in a sink.

use super::entry::Caller;
use super::error::{LoggerError, Result};
use super::sink::LogSink;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Info,
    Error,
}

/// Writes each buffer as a single entry
///
/// Leading and trailing whitespace is trimmed from every write.
pub struct StdLogWriter {
    sink: Arc<dyn LogSink>,
    severity: Severity,
}

impl StdLogWriter {
    /// Write info entries at verbosity 0
    pub fn info(sink: &Arc<dyn LogSink>) -> Self {
        Self::new(sink, Severity::Info)
    }

    /// Write error entries without an error value
    pub fn error(sink: &Arc<dyn LogSink>) -> Self {
        Self::new(sink, Severity::Error)
    }

    fn new(sink: &Arc<dyn LogSink>, severity: Severity) -> Self {
        Self {
            sink: sink.with_call_depth(1),
            severity,
        }
    }
}

impl io::Write for StdLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let msg = text.trim();
        match self.severity {
            Severity::Info => {
                if self.sink.enabled(0) {
                    self.sink.info(0, msg, &[], None);
                }
            }
            Severity::Error => self.sink.error(None, msg, &[], None),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush().map_err(io::Error::other)
    }
}

/// Routes `log` crate records into a sink
///
/// `Error` records become error entries. `Warn` and `Info` are logged at
/// verbosity 0, `Debug` at 1 and `Trace` at 2.
pub struct LogBridge {
    sink: Arc<dyn LogSink>,
}

impl LogBridge {
    pub fn new(sink: &Arc<dyn LogSink>) -> Self {
        Self {
            sink: sink.with_call_depth(1),
        }
    }

    /// Install as the global `log` logger
    pub fn install(self, max_level: log::LevelFilter) -> Result<()> {
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| LoggerError::config("log bridge", e.to_string()))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn verbosity(level: log::Level) -> i32 {
        match level {
            log::Level::Error | log::Level::Warn | log::Level::Info => 0,
            log::Level::Debug => 1,
            log::Level::Trace => 2,
        }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() == log::Level::Error || self.sink.enabled(Self::verbosity(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = record.args().to_string();
        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) => {
                let caller = Caller::new(file, line);
                Some(match record.module_path() {
                    Some(module) => caller.with_function(module),
                    None => caller,
                })
            }
            _ => None,
        };

        if record.level() == log::Level::Error {
            self.sink.error(None, &msg, &[], caller);
        } else {
            self.sink.info(Self::verbosity(record.level()), &msg, &[], caller);
        }
    }

    fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush log bridge: {}", e);
        }
    }
}
