//! Named encoders for entries and individual entry fields
//!
//! Every encoder family has a process-wide registry so encoders can be
//! selected by name, for example from a command-line flag. The built-in
//! encoders are registered on first use; custom encoders may be added with the
//! `register_*` functions. Registering a name twice and looking up a name that
//! was never registered are both errors.
//!
//! | family | built-in names |
//! | --- | --- |
//! | entry | `json`, `console` |
//! | time | `iso8601`, `rfc3339`, `millis`, `nanos`, `secs` |
//! | level | `upper`, `lower`, `color` |
//! | duration | `string`, `nanos`, `millis`, `secs` |
//! | caller | `short`, `full` |

use super::encoder::{ConsoleEncoder, Encoder, EncoderConfig, JsonEncoder};
use super::entry::EntryCaller;
use super::error::{LoggerError, Result};
use super::field::float_value;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Anything that can be looked up by name in a [`Registry`]
pub trait Named {
    fn name(&self) -> &str;
}

/// Builds entry encoders from an [`EncoderConfig`]
pub trait EncoderFactory: Named + Send + Sync {
    fn new_encoder(&self, config: EncoderConfig) -> Box<dyn Encoder>;
}

/// Encodes entry timestamps
pub trait TimeEncoder: Named + Send + Sync {
    fn encode(&self, time: &DateTime<Utc>) -> serde_json::Value;
}

/// Encodes entry levels
pub trait LevelEncoder: Named + Send + Sync {
    fn encode(&self, level: LogLevel) -> String;
}

/// Encodes duration field values
pub trait DurationEncoder: Named + Send + Sync {
    fn encode(&self, duration: Duration) -> serde_json::Value;
}

/// Encodes entry callers
pub trait CallerEncoder: Named + Send + Sync {
    fn encode(&self, caller: &EntryCaller) -> String;
}

/// A name-keyed collection of encoders of one family
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T: ?Sized + Named> Registry<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn with_builtins(kind: &'static str, builtins: Vec<Arc<T>>) -> Self {
        let entries = builtins
            .into_iter()
            .map(|e| (e.name().to_string(), e))
            .collect();
        Self {
            kind,
            entries: RwLock::new(entries),
        }
    }

    /// Add an encoder under its own name
    pub fn register(&self, encoder: Arc<T>) -> Result<()> {
        let name = encoder.name().to_string();
        let mut entries = self.entries.write();
        if entries.contains_key(&name) {
            return Err(LoggerError::duplicate_encoder(self.kind, name));
        }
        entries.insert(name, encoder);
        Ok(())
    }

    /// Find the encoder registered under `name`
    pub fn lookup(&self, name: &str) -> Result<Arc<T>> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LoggerError::unknown_encoder(self.kind, name))
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("kind", &self.kind).finish_non_exhaustive()
    }
}

// ============================================================================
// Entry encoders
// ============================================================================

/// Built-in entry encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line
    Json,
    /// Tab-separated, human-oriented lines
    Console,
}

impl Named for Format {
    fn name(&self) -> &str {
        match self {
            Format::Json => "json",
            Format::Console => "console",
        }
    }
}

impl EncoderFactory for Format {
    fn new_encoder(&self, config: EncoderConfig) -> Box<dyn Encoder> {
        match self {
            Format::Json => Box::new(JsonEncoder::new(config)),
            Format::Console => Box::new(ConsoleEncoder::new(config)),
        }
    }
}

// ============================================================================
// Time encoders
// ============================================================================

/// Built-in time encoders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123+0000`
    Iso8601,
    /// RFC 3339 with milliseconds: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,
    /// Floating-point milliseconds since the Unix epoch
    EpochMillis,
    /// Integer nanoseconds since the Unix epoch
    EpochNanos,
    /// Floating-point seconds since the Unix epoch
    EpochSeconds,
    /// A strftime layout registered under a custom name
    Layout { name: String, layout: String },
}

impl Named for TimeFormat {
    fn name(&self) -> &str {
        match self {
            TimeFormat::Iso8601 => "iso8601",
            TimeFormat::Rfc3339 => "rfc3339",
            TimeFormat::EpochMillis => "millis",
            TimeFormat::EpochNanos => "nanos",
            TimeFormat::EpochSeconds => "secs",
            TimeFormat::Layout { name, .. } => name.as_str(),
        }
    }
}

impl TimeEncoder for TimeFormat {
    fn encode(&self, time: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimeFormat::Iso8601 => {
                serde_json::Value::String(time.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string())
            }
            TimeFormat::Rfc3339 => {
                serde_json::Value::String(time.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string())
            }
            TimeFormat::EpochMillis => float_value(time.timestamp_micros() as f64 / 1e3),
            TimeFormat::EpochNanos => match time.timestamp_nanos_opt() {
                Some(nanos) => serde_json::Value::Number(nanos.into()),
                None => float_value(time.timestamp_micros() as f64 * 1e3),
            },
            TimeFormat::EpochSeconds => float_value(time.timestamp_micros() as f64 / 1e6),
            TimeFormat::Layout { layout, .. } => {
                use std::fmt::Write;
                let mut out = String::new();
                // an invalid layout falls back to ISO 8601 instead of panicking in Display
                if write!(out, "{}", time.format(layout)).is_err() {
                    return TimeFormat::Iso8601.encode(time);
                }
                serde_json::Value::String(out)
            }
        }
    }
}

// ============================================================================
// Level encoders
// ============================================================================

/// Built-in level encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    /// `INFO`
    Upper,
    /// `info`
    Lower,
    /// `INFO` wrapped in terminal color codes
    Color,
}

impl Named for LevelFormat {
    fn name(&self) -> &str {
        match self {
            LevelFormat::Upper => "upper",
            LevelFormat::Lower => "lower",
            LevelFormat::Color => "color",
        }
    }
}

impl LevelEncoder for LevelFormat {
    fn encode(&self, level: LogLevel) -> String {
        match self {
            LevelFormat::Upper => level.to_str().to_string(),
            LevelFormat::Lower => level.to_lowercase_str().to_string(),
            LevelFormat::Color => colorize(level),
        }
    }
}

#[cfg(feature = "console")]
fn colorize(level: LogLevel) -> String {
    use colored::Colorize;
    level.to_str().color(level.color_code()).to_string()
}

#[cfg(not(feature = "console"))]
fn colorize(level: LogLevel) -> String {
    level.to_str().to_string()
}

// ============================================================================
// Duration encoders
// ============================================================================

/// Built-in duration encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFormat {
    /// Human-readable string such as `1.5s` or `2h3m0.5s`
    String,
    /// Integer nanoseconds
    Nanos,
    /// Floating-point milliseconds
    Millis,
    /// Floating-point seconds
    Secs,
}

impl Named for DurationFormat {
    fn name(&self) -> &str {
        match self {
            DurationFormat::String => "string",
            DurationFormat::Nanos => "nanos",
            DurationFormat::Millis => "millis",
            DurationFormat::Secs => "secs",
        }
    }
}

impl DurationEncoder for DurationFormat {
    fn encode(&self, duration: Duration) -> serde_json::Value {
        match self {
            DurationFormat::String => serde_json::Value::String(human_duration(duration)),
            DurationFormat::Nanos => {
                let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
                serde_json::Value::Number(nanos.into())
            }
            DurationFormat::Millis => float_value(duration.as_secs_f64() * 1e3),
            DurationFormat::Secs => float_value(duration.as_secs_f64()),
        }
    }
}

/// Render a duration with the largest fitting unit(s)
fn human_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", nanos as f64 / 1e3);
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", nanos as f64 / 1e6);
    }

    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = (total_secs % 60) as f64 + f64::from(d.subsec_nanos()) / 1e9;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", secs));
    out
}

// ============================================================================
// Caller encoders
// ============================================================================

/// Built-in caller encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerFormat {
    /// `dir/file.rs:42`, keeping only the final directory
    Short,
    /// The full path as recorded at the call site
    Full,
}

impl Named for CallerFormat {
    fn name(&self) -> &str {
        match self {
            CallerFormat::Short => "short",
            CallerFormat::Full => "full",
        }
    }
}

impl CallerEncoder for CallerFormat {
    fn encode(&self, caller: &EntryCaller) -> String {
        match self {
            CallerFormat::Short => format!("{}:{}", trim_path(&caller.file), caller.line),
            CallerFormat::Full => format!("{}:{}", caller.file, caller.line),
        }
    }
}

fn trim_path(path: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == '\\';
    let Some(last) = path.rfind(is_sep) else {
        return path;
    };
    match path[..last].rfind(is_sep) {
        Some(prev) => &path[prev + 1..],
        None => path,
    }
}

// ============================================================================
// Conversions into shared handles
// ============================================================================

macro_rules! into_shared {
    ($($ty:ty => $tr:ident),* $(,)?) => {
        $(
            impl From<$ty> for Arc<dyn $tr> {
                fn from(encoder: $ty) -> Self {
                    Arc::new(encoder)
                }
            }
        )*
    };
}

into_shared! {
    Format => EncoderFactory,
    TimeFormat => TimeEncoder,
    LevelFormat => LevelEncoder,
    DurationFormat => DurationEncoder,
    CallerFormat => CallerEncoder,
}

// ============================================================================
// Global registries
// ============================================================================

static ENCODERS: Lazy<Registry<dyn EncoderFactory>> = Lazy::new(|| {
    Registry::with_builtins("Encoder", vec![Format::Json.into(), Format::Console.into()])
});

static TIME_ENCODERS: Lazy<Registry<dyn TimeEncoder>> = Lazy::new(|| {
    Registry::with_builtins(
        "TimeEncoder",
        vec![
            TimeFormat::Iso8601.into(),
            TimeFormat::Rfc3339.into(),
            TimeFormat::EpochMillis.into(),
            TimeFormat::EpochNanos.into(),
            TimeFormat::EpochSeconds.into(),
        ],
    )
});

static LEVEL_ENCODERS: Lazy<Registry<dyn LevelEncoder>> = Lazy::new(|| {
    Registry::with_builtins(
        "LevelEncoder",
        vec![
            LevelFormat::Upper.into(),
            LevelFormat::Lower.into(),
            LevelFormat::Color.into(),
        ],
    )
});

static DURATION_ENCODERS: Lazy<Registry<dyn DurationEncoder>> = Lazy::new(|| {
    Registry::with_builtins(
        "DurationEncoder",
        vec![
            DurationFormat::String.into(),
            DurationFormat::Nanos.into(),
            DurationFormat::Millis.into(),
            DurationFormat::Secs.into(),
        ],
    )
});

static CALLER_ENCODERS: Lazy<Registry<dyn CallerEncoder>> = Lazy::new(|| {
    Registry::with_builtins(
        "CallerEncoder",
        vec![CallerFormat::Short.into(), CallerFormat::Full.into()],
    )
});

pub fn encoders() -> &'static Registry<dyn EncoderFactory> {
    &ENCODERS
}

pub fn time_encoders() -> &'static Registry<dyn TimeEncoder> {
    &TIME_ENCODERS
}

pub fn level_encoders() -> &'static Registry<dyn LevelEncoder> {
    &LEVEL_ENCODERS
}

pub fn duration_encoders() -> &'static Registry<dyn DurationEncoder> {
    &DURATION_ENCODERS
}

pub fn caller_encoders() -> &'static Registry<dyn CallerEncoder> {
    &CALLER_ENCODERS
}

/// Register an entry encoder for lookup by name
pub fn register_encoder(encoder: Arc<dyn EncoderFactory>) -> Result<()> {
    ENCODERS.register(encoder)
}

/// Register a time encoder for lookup by name
pub fn register_time_encoder(encoder: Arc<dyn TimeEncoder>) -> Result<()> {
    TIME_ENCODERS.register(encoder)
}

/// Register a level encoder for lookup by name
pub fn register_level_encoder(encoder: Arc<dyn LevelEncoder>) -> Result<()> {
    LEVEL_ENCODERS.register(encoder)
}

/// Register a duration encoder for lookup by name
pub fn register_duration_encoder(encoder: Arc<dyn DurationEncoder>) -> Result<()> {
    DURATION_ENCODERS.register(encoder)
}

/// Register a caller encoder for lookup by name
pub fn register_caller_encoder(encoder: Arc<dyn CallerEncoder>) -> Result<()> {
    CALLER_ENCODERS.register(encoder)
}
