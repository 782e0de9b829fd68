//! In-memory appender
//!
//! Clones share the same buffer, so one handle can be given to a logger and
//! another kept to inspect what was written.

use crate::core::{Appender, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BufferAppender {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Written output split into non-empty lines
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Appender for BufferAppender {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.lock().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "buffer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_contents() {
        let reader = BufferAppender::new();
        let mut writer = reader.clone();
        writer.write(b"one\ntwo\n").expect("write");

        assert_eq!(reader.lines(), vec!["one", "two"]);
        reader.clear();
        assert!(writer.is_empty());
    }
}
