//! World definition file format
//!
//! Defines the YAML structure a world is loaded from

use crate::cascade::CascadeRule;
use crate::model::ColumnType;
use serde::{Deserialize, Serialize};

/// Top-level world definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFile {
    /// Registered tables, in the order they are listed
    pub tables: Vec<TableSpec>,

    /// Entity type forest
    #[serde(default)]
    pub types: Vec<TypeSpec>,

    /// Column holding each entity's concrete type key
    pub discriminator: DiscriminatorSpec,

    /// Key-rename cascade rules; the built-in area/room rules when omitted
    #[serde(default)]
    pub cascades: Option<Vec<CascadeRule>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,

    /// Name of the system-assigned integer key column
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,

    #[serde(rename = "type", default = "default_column_type")]
    pub ty: ColumnType,

    #[serde(default)]
    pub business_key: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub references: Option<String>,

    #[serde(default)]
    pub max_length: Option<usize>,

    /// Default in the column's text form (scalars are accepted verbatim)
    #[serde(default, deserialize_with = "deserialize_default")]
    pub default: Option<String>,

    #[serde(default)]
    pub choices: Option<Vec<String>>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub help_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    pub key: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminatorSpec {
    pub table: String,
    pub field: String,
}

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_column_type() -> ColumnType {
    ColumnType::Text
}

/// Normalize a scalar default (`0`, `0.5`, `true`, `"lamp"`) to its text form
fn deserialize_default<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct DefaultVisitor;

    impl<'de> Visitor<'de> for DefaultVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(DefaultVisitor)
}
