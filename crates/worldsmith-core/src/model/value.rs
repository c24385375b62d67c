//! Typed cell values and their canonical text form

use serde_json::Value as JsonValue;

/// A single typed cell
///
/// Variants mirror [`ColumnType`](super::ColumnType); `Null` is shared by all
/// column types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Json(JsonValue),
}

impl Value {
    /// Canonical text representation
    ///
    /// This is the form used by form descriptors and the bulk codec, and the
    /// form every column type parses back to an equal value. NULL renders as
    /// the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Json(j) => j.to_string(),
        }
    }

    /// NULL or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
