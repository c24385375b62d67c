//! Schema Registry
//!
//! Maps table names to their column definitions. Populated once from the
//! world definition and read-only afterwards.

use crate::errors::{ConfigError, Result, WsError};
use crate::model::{ColumnDef, TableDef};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: Vec<TableDef>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Register a set of tables
    ///
    /// # Errors
    ///
    /// Fails on duplicate table names and on cross-references to tables that
    /// are not part of the set.
    pub fn new(tables: Vec<TableDef>) -> std::result::Result<Self, ConfigError> {
        let mut index = HashMap::new();
        for (i, table) in tables.iter().enumerate() {
            if index.insert(table.name().to_string(), i).is_some() {
                return Err(ConfigError::DuplicateTable {
                    table: table.name().to_string(),
                });
            }
        }

        for table in &tables {
            for column in table.columns() {
                if let Some(target) = &column.references {
                    if !index.contains_key(target) {
                        return Err(ConfigError::UnknownReference {
                            table: table.name().to_string(),
                            column: column.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { tables, index })
    }

    /// Look up a table definition
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if the name is not registered.
    pub fn table(&self, name: &str) -> Result<&TableDef> {
        self.index
            .get(name)
            .map(|&i| &self.tables[i])
            .ok_or_else(|| WsError::unknown_table(name))
    }

    /// Ordered column descriptors of a table
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if the name is not registered.
    pub fn columns(&self, name: &str) -> Result<&[ColumnDef]> {
        self.table(name).map(TableDef::columns)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tables in registration order
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(TableDef::name)
    }
}
