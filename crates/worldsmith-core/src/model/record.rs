//! Records and submitted field values

use super::table::TableDef;
use super::value::Value;
use std::collections::BTreeMap;

/// Field name → raw text, as submitted by a caller or read from an import row
pub type FieldValues = BTreeMap<String, String>;

/// One persisted row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub table: String,
    pub id: i64,
    /// Every non-primary-key column of the table
    pub values: BTreeMap<String, Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Canonical text of a field; the primary key renders as the id
    pub fn render(&self, table: &TableDef, field: &str) -> String {
        if table.primary_key().name == field {
            return self.id.to_string();
        }
        self.values.get(field).map(Value::render).unwrap_or_default()
    }

    /// The record's business key, if the table declares one and it is set
    pub fn business_key(&self, table: &TableDef) -> Option<String> {
        let column = table.business_key()?;
        let key = self.values.get(&column.name)?.render();
        (!key.is_empty()).then_some(key)
    }

    /// All columns rendered in registry order, primary key included
    pub fn render_row(&self, table: &TableDef) -> Vec<String> {
        table
            .column_names()
            .map(|name| self.render(table, name))
            .collect()
    }

    /// Data columns rendered as submittable field values
    pub fn to_field_values(&self) -> FieldValues {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.render()))
            .collect()
    }
}
