//! Structured logging engine
//!
//! [`EngineLogger`] is a cheap, cloneable handle over a shared core (encoder,
//! writer, minimum level, sampler). Deriving a named logger or one with extra
//! fields copies the handle and never touches the core, so derived loggers
//! can be handed to other threads freely.
//!
//! Write and encoding failures never reach the caller: they are reported on
//! stderr and the entry is dropped.

use super::appender::SharedAppender;
use super::config::Config;
use super::encoder::Encoder;
use super::entry::{Caller, Entry};
use super::error::Result;
use super::field::Field;
use super::log_level::LogLevel;
use super::metrics::MetricsEncoder;
use super::sampling::Sampler;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

struct Core {
    encoder: Box<dyn Encoder>,
    out: SharedAppender,
    min_level: LogLevel,
    sampler: Option<Sampler>,
}

/// An immutable structured logger
#[derive(Clone)]
pub struct EngineLogger {
    core: Arc<Core>,
    name: String,
    fields: Vec<Field>,
    caller_skip: i32,
    add_caller: bool,
    stack_level: Option<LogLevel>,
    development: bool,
}

impl EngineLogger {
    /// Build the engine described by `config`
    ///
    /// The configured name is applied, context fields start out empty.
    pub fn new(config: &Config) -> Self {
        let mut encoder = config.encoder.new_encoder(config.encoder_config());
        if let Some(ref metrics) = config.metrics {
            encoder = Box::new(MetricsEncoder::new(encoder, Arc::clone(metrics)));
        }

        let stack_level = config.enable_stacktrace.then_some(LogLevel::Error);

        let core = Core {
            encoder,
            out: Arc::clone(&config.writer),
            min_level: LogLevel::Info,
            sampler: Sampler::from_settings(
                config.sample_tick,
                config.sample_first,
                config.sample_thereafter,
            ),
        };

        Self {
            core: Arc::new(core),
            name: config.name.clone(),
            fields: Vec::new(),
            caller_skip: 0,
            add_caller: config.enable_caller,
            stack_level,
            development: config.development,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of frames between the facade and the code that logged
    pub fn caller_skip(&self) -> i32 {
        self.caller_skip
    }

    pub fn is_development(&self) -> bool {
        self.development
    }

    /// A logger whose name has `name` appended, joined by `.`
    #[must_use]
    pub fn named(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let mut logger = self.clone();
        logger.name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.name, name)
        };
        logger
    }

    /// A logger that adds `fields` to every entry
    #[must_use]
    pub fn with(&self, fields: Vec<Field>) -> Self {
        if fields.is_empty() {
            return self.clone();
        }
        let mut logger = self.clone();
        logger.fields.extend(fields);
        logger
    }

    #[must_use]
    pub fn with_caller_skip(&self, skip: i32) -> Self {
        let mut logger = self.clone();
        logger.caller_skip += skip;
        logger
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.core.min_level
    }

    /// Encode and write one entry
    pub fn log(&self, level: LogLevel, message: &str, caller: Option<Caller<'_>>, fields: &[Field]) {
        if !self.enabled(level) {
            return;
        }
        if let Some(ref sampler) = self.core.sampler {
            if !sampler.check(level, message) {
                return;
            }
        }

        let mut entry = Entry::new(level, message).with_logger_name(self.name.as_str());
        if let (true, Some(caller)) = (self.add_caller, caller) {
            entry = entry.with_caller(caller);
        }
        if self.stack_level.is_some_and(|threshold| level >= threshold) {
            entry = entry.with_stack(Backtrace::force_capture().to_string());
        }

        let encoded = if fields.is_empty() {
            self.core.encoder.encode_entry(&entry, &self.fields)
        } else {
            let mut all = Vec::with_capacity(self.fields.len() + fields.len());
            all.extend_from_slice(&self.fields);
            all.extend_from_slice(fields);
            self.core.encoder.encode_entry(&entry, &all)
        };
        let buf = match encoded {
            Ok(buf) => buf,
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to encode entry {:?}: {}", message, e);
                return;
            }
        };

        self.write(&buf);
        if level >= LogLevel::DPanic {
            if let Err(e) = self.sync() {
                eprintln!("[LOGGER ERROR] Failed to sync after {} entry: {}", level, e);
            }
        }
    }

    /// Flush the writer
    pub fn sync(&self) -> Result<()> {
        self.core.out.lock().flush()
    }

    fn write(&self, buf: &[u8]) {
        let mut out = self.core.out.lock();
        let result = catch_unwind(AssertUnwindSafe(|| out.write(buf)));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Writer {} failed: {}", out.name(), e);
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!("[LOGGER CRITICAL] Writer {} panicked: {}", out.name(), panic_msg);
            }
        }
    }

    /// Entries seen and dropped by the sampler, if sampling is on
    pub fn sampled_counts(&self) -> Option<(u64, u64)> {
        self.core
            .sampler
            .as_ref()
            .map(|s| (s.metrics().sampled_count(), s.metrics().dropped_count()))
    }
}

impl fmt::Debug for EngineLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineLogger")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("caller_skip", &self.caller_skip)
            .field("add_caller", &self.add_caller)
            .field("stack_level", &self.stack_level)
            .field("development", &self.development)
            .finish_non_exhaustive()
    }
}
