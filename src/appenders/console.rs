//! Console appender implementation

use crate::core::{Appender, Result};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes encoded entries to stdout or stderr
#[derive(Debug)]
pub struct ConsoleAppender {
    stream: Stream,
}

impl ConsoleAppender {
    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
        }
    }

    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Appender for ConsoleAppender {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().lock().write_all(buf)?,
            Stream::Stderr => io::stderr().lock().write_all(buf)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush()?,
            Stream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}
