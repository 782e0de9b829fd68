//! Appender trait for log output destinations
//!
//! Appenders receive fully encoded entries. They are shared between every
//! logger derived from the same configuration, so the engine always reaches
//! them through a [`SharedAppender`].

use super::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait Appender: Send {
    fn write(&mut self, buf: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// A lock-protected appender handle
pub type SharedAppender = Arc<Mutex<Box<dyn Appender>>>;

/// Wrap an appender so writes from many threads are serialized
pub fn shared<A: Appender + 'static>(appender: A) -> SharedAppender {
    Arc::new(Mutex::new(Box::new(appender)))
}
