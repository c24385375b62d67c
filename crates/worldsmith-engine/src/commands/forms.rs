//! Form descriptors
//!
//! A form describes one table's record (or an empty template) as an ordered
//! list of field descriptors that a UI layer can render without knowing the
//! schema. Values are canonical text, the same text `save_*` accepts back.

use serde::Serialize;
use worldsmith_core::{ColumnDef, FieldValues, Record, TableDef};

pub const WIDGET_HIDDEN: &str = "hidden";
pub const WIDGET_SELECT: &str = "select";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub help_text: String,
    pub widget: String,
    pub hidden: bool,
    pub disabled: bool,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    /// Target table when the field holds another record's business key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

impl FieldDescriptor {
    fn for_column(column: &ColumnDef, value: String) -> Self {
        if column.primary_key {
            return Self {
                name: column.name.clone(),
                label: String::new(),
                help_text: String::new(),
                widget: WIDGET_HIDDEN.to_string(),
                hidden: true,
                disabled: true,
                value,
                choices: None,
                references: None,
            };
        }

        let choices = column.choices.as_ref().map(|choices| {
            choices
                .iter()
                .map(|choice| Choice::new(choice.clone(), choice.clone()))
                .collect::<Vec<_>>()
        });
        let widget = if choices.is_some() {
            WIDGET_SELECT
        } else {
            column.ty.widget()
        };

        Self {
            name: column.name.clone(),
            label: column.label.clone(),
            help_text: column.help_text.clone(),
            widget: widget.to_string(),
            hidden: false,
            disabled: false,
            value,
            choices,
            references: column.references.clone(),
        }
    }

    /// Turn the field into a select over `choices`, showing `value`
    pub fn make_select(&mut self, value: impl Into<String>, choices: Vec<Choice>) {
        self.value = value.into();
        self.widget = WIDGET_SELECT.to_string();
        self.choices = Some(choices);
    }
}

/// Field descriptors for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableForm {
    pub table: String,
    /// Primary key of the record shown; `None` for a template
    pub record_id: Option<i64>,
    pub fields: Vec<FieldDescriptor>,
}

impl TableForm {
    /// Descriptors filled from a stored record
    pub fn from_record(table: &TableDef, record: &Record) -> Self {
        Self {
            table: table.name().to_string(),
            record_id: Some(record.id),
            fields: table
                .columns()
                .iter()
                .map(|column| FieldDescriptor::for_column(column, record.render(table, &column.name)))
                .collect(),
        }
    }

    /// Empty form; every data field shows its column default
    pub fn template(table: &TableDef) -> Self {
        Self {
            table: table.name().to_string(),
            record_id: None,
            fields: table
                .columns()
                .iter()
                .map(|column| {
                    let value = if column.primary_key {
                        String::new()
                    } else {
                        column.default.render()
                    };
                    FieldDescriptor::for_column(column, value)
                })
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Current values of the visible fields, ready to submit back
    pub fn values(&self) -> FieldValues {
        self.fields
            .iter()
            .filter(|f| !f.hidden)
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }
}
