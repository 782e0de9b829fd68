//! The sink capability behind every [`Logger`](crate::Logger)
//!
//! A sink receives already-filtered calls from the facade. Sinks form an
//! immutable derivation tree: `with_values`, `with_name` and
//! `with_call_depth` return new sinks and leave the receiver untouched.
//!
//! Three implementations ship with the crate:
//! - [`DiscardSink`]: drops everything
//! - [`EngineSink`](crate::EngineSink): writes through the structured engine
//! - [`LazySink`](crate::LazySink): forwards to a sink attached later

use super::engine::EngineLogger;
use super::entry::Caller;
use super::error::Result;
use super::field::Arg;
use once_cell::sync::Lazy;
use std::error::Error;
use std::sync::Arc;

/// Information about the facade, passed to a sink once when a logger is
/// built on it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Frames between the code that logs and the sink
    pub call_depth: i32,
}

pub trait LogSink: Send + Sync {
    fn init(&self, info: RuntimeInfo);

    /// Whether info entries at verbosity `level` would be written
    fn enabled(&self, level: i32) -> bool;

    fn info(&self, level: i32, msg: &str, kvs: &[Arg], caller: Option<Caller<'_>>);

    fn error(&self, err: Option<&dyn Error>, msg: &str, kvs: &[Arg], caller: Option<Caller<'_>>);

    fn with_values(&self, kvs: &[Arg]) -> Arc<dyn LogSink>;

    fn with_name(&self, name: &str) -> Arc<dyn LogSink>;

    fn with_call_depth(&self, depth: i32) -> Arc<dyn LogSink>;

    /// The engine logger this sink writes through, if any
    fn underlying(&self) -> Option<EngineLogger>;

    fn flush(&self) -> Result<()>;
}

/// A sink that drops every entry
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

static DISCARD: Lazy<Arc<dyn LogSink>> = Lazy::new(|| Arc::new(DiscardSink));

/// The shared discard sink
pub fn discard() -> Arc<dyn LogSink> {
    Arc::clone(&DISCARD)
}

impl LogSink for DiscardSink {
    fn init(&self, _info: RuntimeInfo) {}

    fn enabled(&self, _level: i32) -> bool {
        false
    }

    fn info(&self, _level: i32, _msg: &str, _kvs: &[Arg], _caller: Option<Caller<'_>>) {}

    fn error(&self, _err: Option<&dyn Error>, _msg: &str, _kvs: &[Arg], _caller: Option<Caller<'_>>) {}

    fn with_values(&self, _kvs: &[Arg]) -> Arc<dyn LogSink> {
        discard()
    }

    fn with_name(&self, _name: &str) -> Arc<dyn LogSink> {
        discard()
    }

    fn with_call_depth(&self, _depth: i32) -> Arc<dyn LogSink> {
        discard()
    }

    fn underlying(&self) -> Option<EngineLogger> {
        None
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
