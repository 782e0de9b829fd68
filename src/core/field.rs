//! Structured key-value fields
//!
//! This module provides:
//! - `FieldValue`: the value half of a structured field
//! - `Field`: an already-paired key and value
//! - `Arg`: one element of a flat `key, value, key, value, ...` list as
//!   accepted by the facade

use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Durations fall back to floating-point seconds; encoders that carry a
    /// duration encoder handle them before reaching this point.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => float_value(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Duration(d) => float_value(d.as_secs_f64()),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Name of the variant, used in diagnostics about misplaced keys
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Int(_) => "int",
            FieldValue::Uint(_) => "uint",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "bool",
            FieldValue::Duration(_) => "duration",
            FieldValue::Null => "null",
        }
    }
}

pub(crate) fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(f.to_string()))
}

macro_rules! field_value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for Arg {
                fn from($v: $ty) -> Self {
                    Arg::Value($body)
                }
            }
        )*
    };
}

field_value_from! {
    String => |s| FieldValue::String(s),
    &str => |s| FieldValue::String(s.to_string()),
    &String => |s| FieldValue::String(s.clone()),
    i64 => |i| FieldValue::Int(i),
    i32 => |i| FieldValue::Int(i64::from(i)),
    u64 => |u| FieldValue::Uint(u),
    u32 => |u| FieldValue::Uint(u64::from(u)),
    usize => |u| FieldValue::Uint(u as u64),
    f64 => |f| FieldValue::Float(f),
    f32 => |f| FieldValue::Float(f64::from(f)),
    bool => |b| FieldValue::Bool(b),
    Duration => |d| FieldValue::Duration(d),
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// A key paired with its value
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// One element of a flat key/value argument list
///
/// Lists are expected to alternate string keys and values. A prebuilt
/// [`Field`] may also appear in key position, in which case it stands for a
/// whole pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(FieldValue),
    Field(Field),
}

impl From<FieldValue> for Arg {
    fn from(value: FieldValue) -> Self {
        Arg::Value(value)
    }
}

impl From<Field> for Arg {
    fn from(field: Field) -> Self {
        Arg::Field(field)
    }
}

impl Arg {
    /// Interpret this argument as the value half of a pair
    pub fn to_value(&self) -> FieldValue {
        match self {
            Arg::Value(v) => v.clone(),
            Arg::Field(f) => FieldValue::String(f.to_string()),
        }
    }
}
