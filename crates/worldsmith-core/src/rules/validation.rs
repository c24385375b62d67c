//! Row validation
//!
//! Turns submitted field text into a complete, typed row for one table.
//! Only checks that need no storage access live here; business-key
//! uniqueness is checked by the store.

use crate::errors::FieldErrors;
use crate::model::{ColumnDef, FieldValues, Record, TableDef, Value};
use std::collections::BTreeMap;

pub const MSG_UNKNOWN_FIELD: &str = "unknown field";
pub const MSG_REQUIRED: &str = "this field is required";
pub const MSG_DUPLICATE_KEY: &str = "a record with this key already exists";

/// Validate submitted values for `table`
///
/// The primary-key column is ignored if submitted. Columns missing from
/// `values` keep their stored value when `existing` is given and take the
/// column default otherwise. The returned map holds every data column.
///
/// # Errors
///
/// Returns one message per failing field (the first violation found).
pub fn validate_values(
    table: &TableDef,
    values: &FieldValues,
    existing: Option<&Record>,
) -> Result<BTreeMap<String, Value>, FieldErrors> {
    let mut errors = FieldErrors::new();

    for name in values.keys() {
        if table.column(name).is_none() {
            errors.insert(name.clone(), MSG_UNKNOWN_FIELD.to_string());
        }
    }

    let mut row = BTreeMap::new();
    for column in table.data_columns() {
        let value = match values.get(&column.name) {
            Some(raw) => match column.ty.parse(raw) {
                Ok(value) => value,
                Err(problem) => {
                    errors.insert(column.name.clone(), problem);
                    continue;
                }
            },
            None => existing
                .and_then(|record| record.get(&column.name).cloned())
                .unwrap_or_else(|| column.default.clone()),
        };

        if let Err(problem) = check_constraints(column, &value) {
            errors.insert(column.name.clone(), problem);
            continue;
        }
        row.insert(column.name.clone(), value);
    }

    if errors.is_empty() {
        Ok(row)
    } else {
        Err(errors)
    }
}

fn check_constraints(column: &ColumnDef, value: &Value) -> Result<(), String> {
    if value.is_blank() {
        if column.is_mandatory() {
            return Err(MSG_REQUIRED.to_string());
        }
        return Ok(());
    }

    if let (Some(max), Value::Text(text)) = (column.max_length, value) {
        if text.chars().count() > max {
            return Err(format!("at most {} characters allowed", max));
        }
    }

    if let Some(choices) = &column.choices {
        let rendered = value.render();
        if !choices.contains(&rendered) {
            return Err(format!("must be one of: {}", choices.join(", ")));
        }
    }

    Ok(())
}
