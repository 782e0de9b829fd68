//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::panic::Location;

/// Source location of a log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller<'a> {
    pub file: &'a str,
    pub line: u32,
    /// Enclosing function or module path, when the call site provides one
    pub function: Option<&'a str>,
}

impl<'a> Caller<'a> {
    pub fn new(file: &'a str, line: u32) -> Self {
        Self {
            file,
            line,
            function: None,
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: &'a str) -> Self {
        self.function = Some(function);
        self
    }

    /// Location of the nearest caller not marked `#[track_caller]`
    #[track_caller]
    pub fn here() -> Caller<'static> {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for Caller<'static> {
    fn from(location: &'static Location<'static>) -> Self {
        Caller::new(location.file(), location.line())
    }
}

/// Owned caller information attached to an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCaller {
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
}

impl From<Caller<'_>> for EntryCaller {
    fn from(caller: Caller<'_>) -> Self {
        Self {
            file: caller.file.to_string(),
            line: caller.line,
            function: caller.function.map(str::to_string),
        }
    }
}

/// A single log record as seen by encoders
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: LogLevel,
    pub time: DateTime<Utc>,
    pub logger_name: String,
    pub message: String,
    pub caller: Option<EntryCaller>,
    pub stack: Option<String>,
}

impl Entry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            logger_name: String::new(),
            message: message.into(),
            caller: None,
            stack: None,
        }
    }

    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller<'_>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: String) -> Self {
        self.stack = Some(stack);
        self
    }
}
