//! # Rust Logsink
//!
//! A structured-logging facade over a pluggable structured engine.
//!
//! Application code logs through a small, stable [`Logger`]: leveled info
//! entries, error entries, key/value pairs, hierarchical names. Everything
//! else (encoding, sampling, writing) is done by the sink behind it.
//!
//! ## Features
//!
//! - **Engine sink**: JSON or console output with named, swappable encoders
//!   for time, level, duration and caller
//! - **Weighted options**: presets and single settings combine predictably
//! - **Lazy sink**: hand out loggers before the destination is known, bind
//!   (and rebind) them all later
//! - **Metrics**: line, byte and encoder error counters per logger name
//! - **Adapters**: `io::Write` and `log` crate bridges into any sink
//!
//! ## Example
//!
//! ```
//! use rust_logsink::prelude::*;
//! use rust_logsink::appenders::BufferAppender;
//! use rust_logsink::core::config;
//!
//! let buffer = BufferAppender::new();
//! let (logger, _sink) = new_logger(&[
//!     config::with_appender(buffer.clone()),
//!     config::with_name("api"),
//! ]);
//!
//! logger.with_values(&kvs!["request_id", 7]).info("handled", &kvs!["status", 200]);
//! assert!(buffer.contents().contains("\"request_id\":7"));
//! ```

pub mod appenders;
pub mod cli;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{BufferAppender, ConsoleAppender, FileAppender};
    pub use crate::core::{
        new_logger, Appender, Arg, Caller, Config, ConfigOption, EngineSink, Field, FieldValue,
        LazySink, LogLevel, LogSink, Logger, LoggerError, Metrics, Result, RuntimeInfo,
    };
    pub use crate::kvs;
}

pub use crate::appenders::{BufferAppender, ConsoleAppender, FileAppender};
pub use crate::core::{
    discard, new_logger, Appender, Arg, Caller, Config, ConfigOption, DiscardSink, EngineLogger,
    EngineSink, Field, FieldValue, LazySink, LogBridge, LogLevel, LogSink, Logger, LoggerError,
    Metrics, Result, RuntimeInfo, StdLogWriter,
};
