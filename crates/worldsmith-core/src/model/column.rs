//! Column semantic types
//!
//! Each type is resolved once when the world definition loads. The codec
//! table below maps a type to its parser, form widget and SQL affinity;
//! rendering goes through [`Value::render`]. Adding a type means adding an
//! enum variant and one table entry.

use super::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Boolean,
    Json,
}

/// Per-type behavior
pub struct TypeCodec {
    pub ty: ColumnType,
    /// Widget name reported in form descriptors
    pub widget: &'static str,
    /// Column affinity used when creating storage tables
    pub sql_type: &'static str,
    /// Parse submitted/imported text into a typed value
    pub parse: fn(&str) -> Result<Value, String>,
}

// Indexed by `ColumnType as usize`; order must follow the enum.
static CODECS: [TypeCodec; 5] = [
    TypeCodec {
        ty: ColumnType::Text,
        widget: "text",
        sql_type: "TEXT",
        parse: parse_text,
    },
    TypeCodec {
        ty: ColumnType::Integer,
        widget: "number",
        sql_type: "INTEGER",
        parse: parse_integer,
    },
    TypeCodec {
        ty: ColumnType::Float,
        widget: "number",
        sql_type: "REAL",
        parse: parse_float,
    },
    TypeCodec {
        ty: ColumnType::Boolean,
        widget: "checkbox",
        sql_type: "INTEGER",
        parse: parse_boolean,
    },
    TypeCodec {
        ty: ColumnType::Json,
        widget: "textarea",
        sql_type: "TEXT",
        parse: parse_json,
    },
];

impl ColumnType {
    pub fn all() -> impl Iterator<Item = ColumnType> {
        CODECS.iter().map(|c| c.ty)
    }

    pub fn codec(self) -> &'static TypeCodec {
        &CODECS[self as usize]
    }

    /// Parse raw text for a column of this type
    ///
    /// # Errors
    ///
    /// Returns a human-readable problem description when the text is not a
    /// valid value of this type.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        (self.codec().parse)(raw)
    }

    pub fn widget(self) -> &'static str {
        self.codec().widget
    }

    pub fn sql_type(self) -> &'static str {
        self.codec().sql_type
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

fn parse_text(raw: &str) -> Result<Value, String> {
    Ok(Value::Text(raw.to_string()))
}

fn parse_integer(raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    raw.parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| format!("'{}' is not a whole number", raw))
}

fn parse_float(raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(format!("'{}' is not a finite number", raw)),
    }
}

fn parse_boolean(raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Value::Boolean(true)),
        "false" | "0" | "no" | "off" => Ok(Value::Boolean(false)),
        _ => Err(format!("'{}' is not a boolean", raw)),
    }
}

fn parse_json(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw)
        .map(Value::Json)
        .map_err(|e| format!("invalid JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_table_follows_enum_order() {
        for ty in ColumnType::all() {
            assert_eq!(ty.codec().ty, ty);
        }
        assert_eq!(ColumnType::all().count(), CODECS.len());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(ColumnType::Integer.parse(" 42 "), Ok(Value::Integer(42)));
        assert_eq!(ColumnType::Integer.parse(""), Ok(Value::Null));
        assert!(ColumnType::Integer.parse("4.5").is_err());
    }

    #[test]
    fn test_parse_float_rejects_non_finite() {
        assert_eq!(ColumnType::Float.parse("0.5"), Ok(Value::Float(0.5)));
        assert!(ColumnType::Float.parse("NaN").is_err());
        assert!(ColumnType::Float.parse("inf").is_err());
    }

    #[test]
    fn test_parse_boolean_spellings() {
        assert_eq!(ColumnType::Boolean.parse("True"), Ok(Value::Boolean(true)));
        assert_eq!(ColumnType::Boolean.parse("0"), Ok(Value::Boolean(false)));
        assert!(ColumnType::Boolean.parse("maybe").is_err());
    }

    #[test]
    fn test_text_keeps_whitespace() {
        assert_eq!(
            ColumnType::Text.parse("  spaced "),
            Ok(Value::Text("  spaced ".to_string()))
        );
        assert_eq!(ColumnType::Text.parse(""), Ok(Value::Text(String::new())));
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(
            ColumnType::Json.parse(r#"{"hp": 10}"#),
            Ok(Value::Json(serde_json::json!({"hp": 10})))
        );
        assert!(ColumnType::Json.parse("{broken").is_err());
    }
}
