//! Command-line flags for logger configuration
//!
//! [`LogArgs`] is meant to be flattened into an application's own `clap`
//! parser. Encoder flags take registry names, so custom encoders registered
//! before parsing are selectable as well.
//!
//! ```
//! use clap::Parser;
//! use rust_logsink::cli::LogArgs;
//! use rust_logsink::core::config::Config;
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     log: LogArgs,
//! }
//!
//! let cli = Cli::parse_from(["app", "--log-level", "2", "--log-format", "console"]);
//! let config = Config::with_options(&cli.log.options().unwrap());
//! assert_eq!(config.level, 2);
//! ```

use crate::core::config::{self, ConfigOption};
use crate::core::encoding;
use crate::core::error::Result;
use clap::Args;
use std::time::Duration;

#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Highest verbosity to log
    #[arg(long = "log-level", value_name = "V")]
    pub level: Option<i32>,

    /// Entry encoder: json, console
    #[arg(long = "log-format", value_name = "NAME")]
    pub format: Option<String>,

    /// Time encoder: iso8601, rfc3339, millis, nanos, secs
    #[arg(long = "log-time-format", value_name = "NAME")]
    pub time_format: Option<String>,

    /// Level encoder: upper, lower, color
    #[arg(long = "log-level-format", value_name = "NAME")]
    pub level_format: Option<String>,

    /// Duration encoder: string, nanos, millis, secs
    #[arg(long = "log-duration-format", value_name = "NAME")]
    pub duration_format: Option<String>,

    /// Caller encoder: short, full
    #[arg(long = "log-caller-format", value_name = "NAME")]
    pub caller_format: Option<String>,

    #[arg(long = "log-time-key", value_name = "KEY")]
    pub time_key: Option<String>,

    #[arg(long = "log-level-key", value_name = "KEY")]
    pub level_key: Option<String>,

    #[arg(long = "log-name-key", value_name = "KEY")]
    pub name_key: Option<String>,

    #[arg(long = "log-caller-key", value_name = "KEY")]
    pub caller_key: Option<String>,

    #[arg(long = "log-function-key", value_name = "KEY")]
    pub function_key: Option<String>,

    #[arg(long = "log-message-key", value_name = "KEY")]
    pub message_key: Option<String>,

    #[arg(long = "log-error-key", value_name = "KEY")]
    pub error_key: Option<String>,

    #[arg(long = "log-stacktrace-key", value_name = "KEY")]
    pub stacktrace_key: Option<String>,

    /// Record the calling file and line
    #[arg(long = "log-caller", value_name = "BOOL")]
    pub caller: Option<bool>,

    /// Record stack traces for errors
    #[arg(long = "log-stacktrace", value_name = "BOOL")]
    pub stacktrace: Option<bool>,

    /// Entries with the same level and message logged per second before sampling
    #[arg(long = "log-sample-initial", value_name = "N")]
    pub sample_initial: Option<u64>,

    /// After the initial entries, log every Nth
    #[arg(long = "log-sample-thereafter", value_name = "N")]
    pub sample_thereafter: Option<u64>,

    /// Use development defaults
    #[arg(long = "log-development")]
    pub development: bool,
}

impl LogArgs {
    /// Turn the given flags into configuration options
    ///
    /// Encoder names are looked up now, so a misspelled name is reported
    /// here rather than when the logger is built.
    pub fn options(&self) -> Result<Vec<ConfigOption>> {
        let mut options = Vec::new();

        if self.development {
            options.push(config::with_development_options());
        }
        if let Some(level) = self.level {
            options.push(config::with_level(level));
        }

        if let Some(ref name) = self.format {
            options.push(config::with_encoder(encoding::encoders().lookup(name)?));
        }
        if let Some(ref name) = self.time_format {
            options.push(config::with_time_encoder(encoding::time_encoders().lookup(name)?));
        }
        if let Some(ref name) = self.level_format {
            options.push(config::with_level_encoder(encoding::level_encoders().lookup(name)?));
        }
        if let Some(ref name) = self.duration_format {
            options.push(config::with_duration_encoder(
                encoding::duration_encoders().lookup(name)?,
            ));
        }
        if let Some(ref name) = self.caller_format {
            options.push(config::with_caller_encoder(encoding::caller_encoders().lookup(name)?));
        }

        let keys: [(&Option<String>, fn(String) -> ConfigOption); 8] = [
            (&self.time_key, |k| config::with_time_key(k)),
            (&self.level_key, |k| config::with_level_key(k)),
            (&self.name_key, |k| config::with_name_key(k)),
            (&self.caller_key, |k| config::with_caller_key(k)),
            (&self.function_key, |k| config::with_function_key(k)),
            (&self.message_key, |k| config::with_message_key(k)),
            (&self.error_key, |k| config::with_error_key(k)),
            (&self.stacktrace_key, |k| config::with_stacktrace_key(k)),
        ];
        for (key, option) in keys {
            if let Some(key) = key {
                options.push(option(key.clone()));
            }
        }

        if let Some(enabled) = self.caller {
            options.push(config::with_caller_enabled(enabled));
        }
        if let Some(enabled) = self.stacktrace {
            options.push(config::with_stacktrace_enabled(enabled));
        }

        if self.sample_initial.is_some() || self.sample_thereafter.is_some() {
            let defaults = config::Config::default();
            let first = self.sample_initial.unwrap_or(defaults.sample_first);
            let thereafter = self.sample_thereafter.unwrap_or(defaults.sample_thereafter);
            options.push(config::with_sampler(Duration::from_secs(1), first, thereafter));
        }

        Ok(options)
    }
}
