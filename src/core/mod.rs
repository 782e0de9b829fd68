//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod encoder;
pub mod encoding;
pub mod engine;
pub mod engine_sink;
pub mod entry;
pub mod error;
pub mod field;
pub mod lazy_sink;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod sampling;
pub mod sink;
pub mod std_log;

pub use appender::{shared, Appender, SharedAppender};
pub use config::{sorted_options, Config, ConfigOption};
pub use encoder::{ConsoleEncoder, Encoder, EncoderConfig, JsonEncoder};
pub use encoding::{
    CallerEncoder, CallerFormat, DurationEncoder, DurationFormat, EncoderFactory, Format,
    LevelEncoder, LevelFormat, Named, Registry, TimeEncoder, TimeFormat,
};
pub use engine::EngineLogger;
pub use engine_sink::EngineSink;
pub use entry::{Caller, Entry, EntryCaller};
pub use error::{LoggerError, Result};
pub use field::{Arg, Field, FieldValue};
pub use lazy_sink::LazySink;
pub use log_level::LogLevel;
pub use logger::{new_logger, Logger};
pub use metrics::{Metrics, MetricsEncoder};
pub use sampling::{Sampler, SamplerMetrics};
pub use sink::{discard, DiscardSink, LogSink, RuntimeInfo};
pub use std_log::{LogBridge, StdLogWriter};
