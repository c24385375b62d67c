//! Table and column definitions

use super::column::ColumnType;
use super::value::Value;
use crate::errors::ConfigError;
use std::collections::HashMap;

/// One column of a table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    /// System-assigned row id; never user-edited
    pub primary_key: bool,
    /// The entity's user-meaningful unique key
    pub business_key: bool,
    pub required: bool,
    /// Target table when this column holds another record's business key
    pub references: Option<String>,
    pub max_length: Option<usize>,
    pub default: Value,
    pub choices: Option<Vec<String>>,
    pub label: String,
    pub help_text: String,
}

impl ColumnDef {
    /// A plain optional column with no constraints
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            ty,
            primary_key: false,
            business_key: false,
            required: false,
            references: None,
            max_length: None,
            default: Value::Null,
            choices: None,
            help_text: String::new(),
        }
    }

    pub fn is_reference(&self) -> bool {
        self.references.is_some()
    }

    /// Blank values are rejected for required columns and business keys
    pub fn is_mandatory(&self) -> bool {
        self.required || self.business_key
    }
}

/// A registered table with its ordered columns
///
/// Invariants: exactly one primary-key column, which is an integer and comes
/// first; at most one business-key column; column names unique.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
    index: HashMap<String, usize>,
    business_key: Option<usize>,
}

impl TableDef {
    /// Build a table definition, adding an `id` primary key when none of the
    /// columns is marked as one.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when an invariant of the table is violated.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self, ConfigError> {
        let name = name.into();
        check_identifier(&name)?;

        let mut primary: Vec<ColumnDef> = Vec::new();
        let mut rest: Vec<ColumnDef> = Vec::new();
        for column in columns {
            check_identifier(&column.name)?;
            if column.primary_key {
                primary.push(column);
            } else {
                rest.push(column);
            }
        }

        let pk = match primary.len() {
            0 => {
                let mut pk = ColumnDef::new("id", ColumnType::Integer);
                pk.primary_key = true;
                pk
            }
            1 => primary.remove(0),
            _ => return Err(ConfigError::MultiplePrimaryKeys { table: name }),
        };
        if pk.ty != ColumnType::Integer {
            return Err(ConfigError::InvalidPrimaryKey {
                table: name,
                column: pk.name,
            });
        }

        let mut ordered = Vec::with_capacity(rest.len() + 1);
        ordered.push(pk);
        ordered.extend(rest);

        let mut index = HashMap::new();
        let mut business_key = None;
        for (i, column) in ordered.iter().enumerate() {
            if index.insert(column.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
            if column.business_key {
                if business_key.is_some() {
                    return Err(ConfigError::MultipleBusinessKeys { table: name });
                }
                business_key = Some(i);
            }
        }

        Ok(Self {
            name,
            columns: ordered,
            index,
            business_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in registry order, primary key first
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn primary_key(&self) -> &ColumnDef {
        &self.columns[0]
    }

    pub fn business_key(&self) -> Option<&ColumnDef> {
        self.business_key.map(|i| &self.columns[i])
    }

    /// Columns a caller may write (everything except the primary key)
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().skip(1)
    }
}

/// Identifiers are interpolated into SQL, so only a conservative alphabet is
/// accepted.
pub(crate) fn check_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
