//! Conversion between typed cell values and SQLite values

use crate::errors::{corrupt_value, Result};
use rusqlite::types::{Value as SqlValue, ValueRef};
use worldsmith_core::{ColumnDef, Value};

pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Json(j) => SqlValue::Text(j.to_string()),
    }
}

pub(crate) fn from_sql(table: &str, column: &ColumnDef, raw: ValueRef<'_>) -> Result<Value> {
    use worldsmith_core::ColumnType;

    let value = match (column.ty, raw) {
        (_, ValueRef::Null) => Value::Null,
        (ColumnType::Text, ValueRef::Text(bytes)) => Value::Text(utf8(table, column, bytes)?),
        (ColumnType::Integer, ValueRef::Integer(i)) => Value::Integer(i),
        (ColumnType::Float, ValueRef::Real(f)) => Value::Float(f),
        (ColumnType::Float, ValueRef::Integer(i)) => Value::Float(i as f64),
        (ColumnType::Boolean, ValueRef::Integer(i)) => Value::Boolean(i != 0),
        (ColumnType::Json, ValueRef::Text(bytes)) => {
            let text = utf8(table, column, bytes)?;
            let json = serde_json::from_str(&text)
                .map_err(|e| corrupt_value(table, &column.name, &e.to_string()))?;
            Value::Json(json)
        }
        (ty, other) => {
            return Err(corrupt_value(
                table,
                &column.name,
                &format!("{:?} stored in a {} column", other.data_type(), ty),
            ))
        }
    };
    Ok(value)
}

fn utf8(table: &str, column: &ColumnDef, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| corrupt_value(table, &column.name, &e.to_string()))
}
