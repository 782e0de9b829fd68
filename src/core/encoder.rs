//! Entry encoders
//!
//! Provides the two built-in output formats:
//! - JSON: one machine-readable object per line
//! - Console: tab-separated, human-readable lines
//!
//! Both honor the key names and field encoders of an [`EncoderConfig`]. An
//! empty key omits the corresponding entry field.

use super::encoding::{
    CallerEncoder, CallerFormat, DurationEncoder, DurationFormat, LevelEncoder, LevelFormat,
    TimeEncoder, TimeFormat,
};
use super::entry::Entry;
use super::error::Result;
use super::field::{Field, FieldValue};
use std::fmt;
use std::sync::Arc;

/// Turns an entry and its fields into bytes ready for an appender
pub trait Encoder: Send + Sync {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>>;
}

/// Key names and field encoders shared by every entry encoder
#[derive(Clone)]
pub struct EncoderConfig {
    pub time_key: String,
    pub level_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub function_key: String,
    pub message_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,

    pub time_encoder: Arc<dyn TimeEncoder>,
    pub level_encoder: Arc<dyn LevelEncoder>,
    pub duration_encoder: Arc<dyn DurationEncoder>,
    pub caller_encoder: Arc<dyn CallerEncoder>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_key: "time".to_string(),
            level_key: "level".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            function_key: String::new(),
            message_key: "msg".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            time_encoder: TimeFormat::Iso8601.into(),
            level_encoder: LevelFormat::Upper.into(),
            duration_encoder: DurationFormat::Secs.into(),
            caller_encoder: CallerFormat::Short.into(),
        }
    }
}

impl fmt::Debug for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderConfig")
            .field("time_key", &self.time_key)
            .field("level_key", &self.level_key)
            .field("name_key", &self.name_key)
            .field("caller_key", &self.caller_key)
            .field("function_key", &self.function_key)
            .field("message_key", &self.message_key)
            .field("stacktrace_key", &self.stacktrace_key)
            .field("time_encoder", &self.time_encoder.name())
            .field("level_encoder", &self.level_encoder.name())
            .field("duration_encoder", &self.duration_encoder.name())
            .field("caller_encoder", &self.caller_encoder.name())
            .finish()
    }
}

impl EncoderConfig {
    fn field_value(&self, value: &FieldValue) -> serde_json::Value {
        match value {
            FieldValue::Duration(d) => self.duration_encoder.encode(*d),
            other => other.to_json_value(),
        }
    }
}

/// Writes `"key":value` pairs into a JSON object while keeping insertion order
struct ObjectWriter {
    buf: Vec<u8>,
    empty: bool,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.push(b'{');
        Self { buf, empty: true }
    }

    fn add(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        serde_json::to_writer(&mut self.buf, key)?;
        self.buf.push(b':');
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(())
    }

    fn add_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.add(key, &serde_json::Value::String(value.to_string()))
    }

    fn is_empty(&self) -> bool {
        self.empty
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.push(b'}');
        self.buf
    }
}

/// JSON encoder
///
/// Example: `{"time":"2025-01-08T10:30:45.123+0000","level":"INFO","msg":"Request processed"}`
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Encoder for JsonEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let mut obj = ObjectWriter::new();

        if !cfg.time_key.is_empty() {
            obj.add(&cfg.time_key, &cfg.time_encoder.encode(&entry.time))?;
        }
        if !cfg.level_key.is_empty() {
            obj.add_str(&cfg.level_key, &cfg.level_encoder.encode(entry.level))?;
        }
        if !cfg.name_key.is_empty() && !entry.logger_name.is_empty() {
            obj.add_str(&cfg.name_key, &entry.logger_name)?;
        }
        if let Some(ref caller) = entry.caller {
            if !cfg.caller_key.is_empty() {
                obj.add_str(&cfg.caller_key, &cfg.caller_encoder.encode(caller))?;
            }
            if let (false, Some(function)) = (cfg.function_key.is_empty(), &caller.function) {
                obj.add_str(&cfg.function_key, function)?;
            }
        }
        if !cfg.message_key.is_empty() {
            obj.add_str(&cfg.message_key, &entry.message)?;
        }
        for field in fields {
            obj.add(&field.key, &cfg.field_value(&field.value))?;
        }
        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), &entry.stack) {
            obj.add_str(&cfg.stacktrace_key, stack)?;
        }

        let mut out = obj.finish();
        out.extend_from_slice(cfg.line_ending.as_bytes());
        Ok(out)
    }
}

/// Console encoder
///
/// Example: `2025-01-08T10:30:45.123+0000	INFO	api	core/server.rs:42	Request processed	{"status":200}`
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Encoder for ConsoleEncoder {
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let mut parts: Vec<String> = Vec::with_capacity(6);

        if !cfg.time_key.is_empty() {
            parts.push(match cfg.time_encoder.encode(&entry.time) {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
        }
        if !cfg.level_key.is_empty() {
            parts.push(cfg.level_encoder.encode(entry.level));
        }
        if !cfg.name_key.is_empty() && !entry.logger_name.is_empty() {
            parts.push(entry.logger_name.clone());
        }
        if let Some(ref caller) = entry.caller {
            if !cfg.caller_key.is_empty() {
                parts.push(cfg.caller_encoder.encode(caller));
            }
            if let (false, Some(function)) = (cfg.function_key.is_empty(), &caller.function) {
                parts.push(function.clone());
            }
        }
        if !cfg.message_key.is_empty() {
            parts.push(entry.message.clone());
        }

        let mut context = ObjectWriter::new();
        for field in fields {
            context.add(&field.key, &cfg.field_value(&field.value))?;
        }
        if !context.is_empty() {
            parts.push(String::from_utf8_lossy(&context.finish()).into_owned());
        }

        let mut line = parts.join("\t");
        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), &entry.stack) {
            line.push('\n');
            line.push_str(stack);
        }
        line.push_str(&cfg.line_ending);
        Ok(line.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Caller;
    use crate::core::LogLevel;
    use std::time::Duration;

    fn decode(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).expect("valid json line")
    }

    #[test]
    fn test_json_format() {
        let entry = Entry::new(LogLevel::Error, "Error occurred")
            .with_logger_name("db")
            .with_caller(Caller::new("src/db/pool.rs", 7));
        let out = JsonEncoder::new(EncoderConfig::default())
            .encode_entry(&entry, &[])
            .expect("encodes");

        assert!(out.ends_with(b"\n"));
        let parsed = decode(&out);
        assert_eq!(parsed["level"], "ERROR");
        assert_eq!(parsed["msg"], "Error occurred");
        assert_eq!(parsed["logger"], "db");
        assert_eq!(parsed["caller"], "db/pool.rs:7");
        assert!(parsed["time"].is_string());
    }

    #[test]
    fn test_json_keeps_field_order() {
        let entry = Entry::new(LogLevel::Info, "ordered");
        let fields = vec![Field::new("zeta", 1), Field::new("alpha", 2)];
        let out = JsonEncoder::new(EncoderConfig::default())
            .encode_entry(&entry, &fields)
            .expect("encodes");
        let text = String::from_utf8(out).expect("utf8");

        let zeta = text.find("\"zeta\"").expect("zeta present");
        let alpha = text.find("\"alpha\"").expect("alpha present");
        let msg = text.find("\"msg\"").expect("msg present");
        assert!(msg < zeta && zeta < alpha);
    }

    #[test]
    fn test_json_empty_key_omits_field() {
        let config = EncoderConfig {
            time_key: String::new(),
            caller_key: String::new(),
            ..EncoderConfig::default()
        };
        let entry = Entry::new(LogLevel::Info, "quiet").with_caller(Caller::new("a/b.rs", 1));
        let parsed = decode(&JsonEncoder::new(config).encode_entry(&entry, &[]).expect("encodes"));

        assert!(parsed.get("time").is_none());
        assert!(parsed.get("caller").is_none());
        assert_eq!(parsed["msg"], "quiet");
    }

    #[test]
    fn test_json_function_key() {
        let config = EncoderConfig {
            function_key: "func".to_string(),
            ..EncoderConfig::default()
        };
        let entry = Entry::new(LogLevel::Info, "with function")
            .with_caller(Caller::new("src/main.rs", 3).with_function("app::main"));
        let parsed = decode(&JsonEncoder::new(config).encode_entry(&entry, &[]).expect("encodes"));
        assert_eq!(parsed["func"], "app::main");
    }

    #[test]
    fn test_json_duration_uses_duration_encoder() {
        let entry = Entry::new(LogLevel::Info, "timed");
        let fields = vec![Field::new("took", Duration::from_millis(250))];

        let secs = decode(
            &JsonEncoder::new(EncoderConfig::default())
                .encode_entry(&entry, &fields)
                .expect("encodes"),
        );
        assert_eq!(secs["took"], 0.25);

        let config = EncoderConfig {
            duration_encoder: DurationFormat::String.into(),
            ..EncoderConfig::default()
        };
        let string = decode(&JsonEncoder::new(config).encode_entry(&entry, &fields).expect("encodes"));
        assert_eq!(string["took"], "250ms");
    }

    #[test]
    fn test_json_stacktrace() {
        let entry = Entry::new(LogLevel::Error, "boom").with_stack("frame 0".to_string());
        let parsed = decode(
            &JsonEncoder::new(EncoderConfig::default())
                .encode_entry(&entry, &[])
                .expect("encodes"),
        );
        assert_eq!(parsed["stacktrace"], "frame 0");
    }

    #[test]
    fn test_console_format() {
        let config = EncoderConfig {
            time_key: String::new(),
            ..EncoderConfig::default()
        };
        let entry = Entry::new(LogLevel::Info, "Request processed")
            .with_logger_name("api")
            .with_caller(Caller::new("src/http/server.rs", 42));
        let fields = vec![Field::new("status", 200)];
        let out = ConsoleEncoder::new(config)
            .encode_entry(&entry, &fields)
            .expect("encodes");

        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "INFO\tapi\thttp/server.rs:42\tRequest processed\t{\"status\":200}\n"
        );
    }

    #[test]
    fn test_console_stack_on_its_own_line() {
        let config = EncoderConfig {
            time_key: String::new(),
            ..EncoderConfig::default()
        };
        let entry = Entry::new(LogLevel::Error, "boom").with_stack("frame 0".to_string());
        let out = ConsoleEncoder::new(config)
            .encode_entry(&entry, &[])
            .expect("encodes");
        assert_eq!(String::from_utf8(out).expect("utf8"), "ERROR\tboom\nframe 0\n");
    }
}
