//! Logging macros for ergonomic structured logging.
//!
//! The macros record the calling module as the entry's function, and accept
//! either `format!`-style arguments or a literal message followed by
//! `key => value` pairs after a semicolon.
//!
//! # Examples
//!
//! ```
//! use rust_logsink::prelude::*;
//! use rust_logsink::{error, info};
//! use std::io;
//!
//! let logger = Logger::discard();
//!
//! info!(logger, "Server started");
//! info!(logger, "Server listening on port {}", 8080);
//! info!(logger.v(1), "Request served"; "path" => "/health", "status" => 200);
//!
//! let err = io::Error::new(io::ErrorKind::Other, "connection reset");
//! error!(logger, err, "Request failed"; "attempt" => 3);
//! error!(logger, "No error value");
//! ```

/// Build a flat key/value argument list.
///
/// ```
/// use rust_logsink::{kvs, Arg, Field};
///
/// let args = kvs!["user", "ada", "attempt", 3, Field::new("ok", true)];
/// assert_eq!(args.len(), 5);
/// assert!(matches!(args[4], Arg::Field(_)));
/// ```
#[macro_export]
macro_rules! kvs {
    ($($item:expr),* $(,)?) => {
        [$($crate::Arg::from($item)),*]
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __caller {
    () => {
        $crate::Caller::new(file!(), line!()).with_function(module_path!())
    };
}

/// Log an info entry at the logger's verbosity.
///
/// ```
/// # use rust_logsink::prelude::*;
/// # let logger = Logger::discard();
/// use rust_logsink::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// info!(logger, "Cache miss"; "key" => "user:42");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $msg:literal; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.info_at(
            $crate::__caller!(),
            $msg,
            &[$($crate::Arg::from($key), $crate::Arg::from($value)),+],
        )
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.info_at($crate::__caller!(), &format!($($arg)+), &[])
    };
}

/// Log an error entry, optionally carrying an error value.
///
/// ```
/// # use rust_logsink::prelude::*;
/// # let logger = Logger::discard();
/// use rust_logsink::error;
/// use std::io;
///
/// let err = io::Error::new(io::ErrorKind::NotFound, "config.toml");
/// error!(logger, err, "Failed to load configuration");
/// error!(logger, err, "Failed to load {}", "config.toml");
/// error!(logger, "Shutting down"; "reason" => "signal");
/// error!(logger, "Exit code: {}", 2);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $msg:literal; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.error_at(
            $crate::__caller!(),
            None,
            $msg,
            &[$($crate::Arg::from($key), $crate::Arg::from($value)),+],
        )
    };
    ($logger:expr, $msg:literal $(, $arg:expr)* $(,)?) => {
        $logger.error_at($crate::__caller!(), None, &format!($msg $(, $arg)*), &[])
    };
    ($logger:expr, $err:expr, $msg:literal; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.error_at(
            $crate::__caller!(),
            Some(&$err as &dyn ::std::error::Error),
            $msg,
            &[$($crate::Arg::from($key), $crate::Arg::from($value)),+],
        )
    };
    ($logger:expr, $err:expr, $($arg:tt)+) => {
        $logger.error_at(
            $crate::__caller!(),
            Some(&$err as &dyn ::std::error::Error),
            &format!($($arg)+),
            &[],
        )
    };
}
