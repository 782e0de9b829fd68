//! Logger configuration and weighted options
//!
//! A [`Config`] starts from fixed defaults and is shaped by a list of
//! [`ConfigOption`]s. Options carry a weight: heavier options are applied
//! first, so a bundle such as [`with_development_options`] (weight 1) can be
//! combined with single-field options (weight 0) that override individual
//! bundle settings regardless of the order they were listed in. Options of
//! equal weight keep their relative order.
//!
//! # Example
//!
//! ```
//! use rust_logsink::core::config::{self, Config};
//!
//! let config = Config::with_options(&[
//!     config::with_level(5),
//!     config::with_development_options(),
//! ]);
//! assert_eq!(config.level, 5);
//! assert!(config.development);
//! ```

use super::appender::{shared, Appender, SharedAppender};
use super::encoder::EncoderConfig;
use super::encoding::{
    CallerEncoder, CallerFormat, DurationEncoder, DurationFormat, EncoderFactory, Format,
    LevelEncoder, LevelFormat, TimeEncoder, TimeFormat,
};
use super::metrics::Metrics;
use crate::appenders::ConsoleAppender;
use std::borrow::Cow;
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to build an engine sink
#[derive(Clone)]
pub struct Config {
    pub writer: SharedAppender,
    pub name: String,
    /// Highest verbosity that is logged
    pub level: i32,

    pub time_key: String,
    pub level_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub function_key: String,
    pub message_key: String,
    pub error_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,

    pub encoder: Arc<dyn EncoderFactory>,
    pub time_encoder: Arc<dyn TimeEncoder>,
    pub level_encoder: Arc<dyn LevelEncoder>,
    pub duration_encoder: Arc<dyn DurationEncoder>,
    pub caller_encoder: Arc<dyn CallerEncoder>,

    pub enable_stacktrace: bool,
    pub enable_caller: bool,
    pub development: bool,

    pub sample_tick: Duration,
    pub sample_first: u64,
    pub sample_thereafter: u64,

    pub metrics: Option<Arc<Metrics>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            writer: shared(ConsoleAppender::stderr()),
            name: String::new(),
            level: 0,
            time_key: "time".to_string(),
            level_key: "level".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            function_key: String::new(),
            message_key: "msg".to_string(),
            error_key: "error".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            encoder: Format::Json.into(),
            time_encoder: TimeFormat::Iso8601.into(),
            level_encoder: LevelFormat::Upper.into(),
            duration_encoder: DurationFormat::Secs.into(),
            caller_encoder: CallerFormat::Short.into(),
            enable_stacktrace: false,
            enable_caller: true,
            development: false,
            sample_tick: Duration::from_secs(1),
            sample_first: 100,
            sample_thereafter: 100,
            metrics: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("writer", &self.writer.lock().name())
            .field("name", &self.name)
            .field("level", &self.level)
            .field("encoder", &self.encoder.name())
            .field("error_key", &self.error_key)
            .field("enable_stacktrace", &self.enable_stacktrace)
            .field("enable_caller", &self.enable_caller)
            .field("development", &self.development)
            .field("sample_tick", &self.sample_tick)
            .field("sample_first", &self.sample_first)
            .field("sample_thereafter", &self.sample_thereafter)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Apply `options` to the defaults, heaviest first
    pub fn with_options(options: &[ConfigOption]) -> Self {
        let mut config = Self::default();
        for option in sorted_options(options).iter() {
            option.apply(&mut config);
        }
        config
    }

    /// The part of the configuration entry encoders care about
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            time_key: self.time_key.clone(),
            level_key: self.level_key.clone(),
            name_key: self.name_key.clone(),
            caller_key: self.caller_key.clone(),
            function_key: self.function_key.clone(),
            message_key: self.message_key.clone(),
            stacktrace_key: self.stacktrace_key.clone(),
            line_ending: self.line_ending.clone(),
            time_encoder: Arc::clone(&self.time_encoder),
            level_encoder: Arc::clone(&self.level_encoder),
            duration_encoder: Arc::clone(&self.duration_encoder),
            caller_encoder: Arc::clone(&self.caller_encoder),
        }
    }
}

type ApplyFn = dyn Fn(&mut Config) + Send + Sync;

/// A weighted mutation of a [`Config`]
#[derive(Clone)]
pub struct ConfigOption {
    apply: Arc<ApplyFn>,
    weight: i32,
}

impl ConfigOption {
    /// An option with the default weight of 0
    pub fn new(apply: impl Fn(&mut Config) + Send + Sync + 'static) -> Self {
        Self::weighted(0, apply)
    }

    pub fn weighted(weight: i32, apply: impl Fn(&mut Config) + Send + Sync + 'static) -> Self {
        Self {
            apply: Arc::new(apply),
            weight,
        }
    }

    #[inline]
    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn apply(&self, config: &mut Config) {
        (self.apply)(config)
    }
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOption")
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Order options by descending weight, keeping input order among equals
///
/// Returns the input unchanged when it is already ordered.
pub fn sorted_options(options: &[ConfigOption]) -> Cow<'_, [ConfigOption]> {
    if options.windows(2).all(|w| w[0].weight >= w[1].weight) {
        return Cow::Borrowed(options);
    }
    let mut sorted = options.to_vec();
    sorted.sort_by_key(|o| Reverse(o.weight));
    Cow::Owned(sorted)
}

// ============================================================================
// Options
// ============================================================================

/// Send output to `writer`
pub fn with_writer(writer: SharedAppender) -> ConfigOption {
    ConfigOption::new(move |c| c.writer = Arc::clone(&writer))
}

/// Send output to `appender`
pub fn with_appender<A: Appender + 'static>(appender: A) -> ConfigOption {
    with_writer(shared(appender))
}

pub fn with_name(name: impl Into<String>) -> ConfigOption {
    let name = name.into();
    ConfigOption::new(move |c| c.name = name.clone())
}

/// Log everything up to verbosity `level`
pub fn with_level(level: i32) -> ConfigOption {
    ConfigOption::new(move |c| c.level = level)
}

macro_rules! key_options {
    ($($(#[$doc:meta])* $fn_name:ident => $field:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $fn_name(key: impl Into<String>) -> ConfigOption {
                let key = key.into();
                ConfigOption::new(move |c| c.$field = key.clone())
            }
        )*
    };
}

key_options! {
    with_time_key => time_key,
    with_level_key => level_key,
    with_name_key => name_key,
    with_caller_key => caller_key,
    /// An empty key (the default) leaves the function out of entries
    with_function_key => function_key,
    with_message_key => message_key,
    /// An empty key leaves errors out of entries
    with_error_key => error_key,
    with_stacktrace_key => stacktrace_key,
    with_line_ending => line_ending,
}

pub fn with_encoder(encoder: impl Into<Arc<dyn EncoderFactory>>) -> ConfigOption {
    let encoder = encoder.into();
    ConfigOption::new(move |c| c.encoder = Arc::clone(&encoder))
}

pub fn with_time_encoder(encoder: impl Into<Arc<dyn TimeEncoder>>) -> ConfigOption {
    let encoder = encoder.into();
    ConfigOption::new(move |c| c.time_encoder = Arc::clone(&encoder))
}

pub fn with_level_encoder(encoder: impl Into<Arc<dyn LevelEncoder>>) -> ConfigOption {
    let encoder = encoder.into();
    ConfigOption::new(move |c| c.level_encoder = Arc::clone(&encoder))
}

pub fn with_duration_encoder(encoder: impl Into<Arc<dyn DurationEncoder>>) -> ConfigOption {
    let encoder = encoder.into();
    ConfigOption::new(move |c| c.duration_encoder = Arc::clone(&encoder))
}

pub fn with_caller_encoder(encoder: impl Into<Arc<dyn CallerEncoder>>) -> ConfigOption {
    let encoder = encoder.into();
    ConfigOption::new(move |c| c.caller_encoder = Arc::clone(&encoder))
}

pub fn with_caller_enabled(enabled: bool) -> ConfigOption {
    ConfigOption::new(move |c| c.enable_caller = enabled)
}

pub fn with_stacktrace_enabled(enabled: bool) -> ConfigOption {
    ConfigOption::new(move |c| c.enable_stacktrace = enabled)
}

/// Log the first `first` entries with the same level and message in each
/// `tick`, then every `thereafter`-th
///
/// Zero for both counts turns sampling off.
pub fn with_sampler(tick: Duration, first: u64, thereafter: u64) -> ConfigOption {
    ConfigOption::weighted(1, move |c| {
        c.sample_tick = tick;
        c.sample_first = first;
        c.sample_thereafter = thereafter;
    })
}

/// Human-friendly preset for local development
pub fn with_development_options() -> ConfigOption {
    ConfigOption::weighted(1, |c| {
        c.level = 3;
        c.function_key = "func".to_string();
        c.encoder = Format::Console.into();
        c.level_encoder = LevelFormat::Color.into();
        c.duration_encoder = DurationFormat::String.into();
        c.enable_stacktrace = true;
        c.development = true;
    })
}

/// Collect line, byte and encoder error counts into `metrics`
pub fn with_metrics(metrics: Arc<Metrics>) -> ConfigOption {
    ConfigOption::new(move |c| c.metrics = Some(Arc::clone(&metrics)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.level, 0);
        assert_eq!(config.name, "");
        assert_eq!(config.message_key, "msg");
        assert_eq!(config.error_key, "error");
        assert_eq!(config.function_key, "");
        assert_eq!(config.encoder.name(), "json");
        assert_eq!(config.time_encoder.name(), "iso8601");
        assert_eq!(config.level_encoder.name(), "upper");
        assert_eq!(config.duration_encoder.name(), "secs");
        assert_eq!(config.caller_encoder.name(), "short");
        assert!(config.enable_caller);
        assert!(!config.enable_stacktrace);
        assert_eq!(config.sample_tick, Duration::from_secs(1));
        assert_eq!((config.sample_first, config.sample_thereafter), (100, 100));
        assert_eq!(config.writer.lock().name(), "stderr");
    }

    #[test]
    fn test_sorted_options_borrows_when_ordered() {
        let options = vec![with_development_options(), with_level(2), with_name("a")];
        assert!(matches!(sorted_options(&options), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sorted_options_is_stable() {
        let options = vec![
            ConfigOption::weighted(0, |c| c.name.push('a')),
            ConfigOption::weighted(2, |c| c.name.push('b')),
            ConfigOption::weighted(0, |c| c.name.push('c')),
            ConfigOption::weighted(2, |c| c.name.push('d')),
        ];
        let sorted = sorted_options(&options);
        assert!(matches!(sorted, Cow::Owned(_)));
        let weights: Vec<i32> = sorted.iter().map(ConfigOption::weight).collect();
        assert_eq!(weights, vec![2, 2, 0, 0]);

        assert_eq!(Config::with_options(&options).name, "bdac");
    }

    #[test]
    fn test_single_field_overrides_bundle() {
        let config = Config::with_options(&[
            with_level(1),
            with_development_options(),
            with_level(5),
        ]);
        assert_eq!(config.level, 5);
        assert_eq!(config.function_key, "func");
        assert_eq!(config.encoder.name(), "console");
    }

    #[test]
    fn test_later_option_wins() {
        let config = Config::with_options(&[with_name("first"), with_name("second")]);
        assert_eq!(config.name, "second");
    }

    #[test]
    fn test_sampler_option() {
        let config = Config::with_options(&[
            with_sampler(Duration::from_millis(10), 3, 7),
            with_caller_enabled(false),
        ]);
        assert_eq!(config.sample_tick, Duration::from_millis(10));
        assert_eq!(config.sample_first, 3);
        assert_eq!(config.sample_thereafter, 7);
        assert!(!config.enable_caller);
    }

    #[test]
    fn test_encoder_config_carries_keys() {
        let config = Config::with_options(&[with_message_key("message"), with_time_key("")]);
        let encoder_config = config.encoder_config();
        assert_eq!(encoder_config.message_key, "message");
        assert_eq!(encoder_config.time_key, "");
    }
}
