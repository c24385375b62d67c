//! Record Store
//!
//! CRUD over any registered table. Every operation is scoped to one table
//! (`RecordStore::table`) and runs on the connection it was created with, so
//! passing a transaction makes writes visible to later reads in that same
//! transaction and invisible elsewhere until commit.

use super::filter::{Filter, Predicate};
use super::sql_value::{from_sql, to_sql};
use crate::errors::{from_rusqlite, Result};
use crate::migrations::quote_ident;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use std::collections::BTreeMap;
use worldsmith_core::errors::{FieldErrors, WsError, WsErrorKind};
use worldsmith_core::rules::validation::{validate_values, MSG_DUPLICATE_KEY};
use worldsmith_core::{FieldValues, Record, SchemaRegistry, TableDef, Value};

/// Entry point: resolves table names through the schema registry
#[derive(Clone, Copy)]
pub struct RecordStore<'a> {
    conn: &'a Connection,
    schema: &'a SchemaRegistry,
}

impl<'a> RecordStore<'a> {
    pub fn new(conn: &'a Connection, schema: &'a SchemaRegistry) -> Self {
        Self { conn, schema }
    }

    /// Operations on one table
    ///
    /// # Errors
    ///
    /// `UnknownTable` if the table is not registered.
    pub fn table(&self, name: &str) -> Result<TableStore<'a>> {
        let def = self.schema.table(name)?;
        Ok(TableStore {
            conn: self.conn,
            def,
        })
    }

    pub fn schema(&self) -> &'a SchemaRegistry {
        self.schema
    }

    pub fn connection(&self) -> &'a Connection {
        self.conn
    }
}

/// A validated row, ready to be written by [`TableStore::commit`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWrite {
    table: String,
    id: Option<i64>,
    values: BTreeMap<String, Value>,
}

impl PreparedWrite {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary key of the row being updated; `None` for an insert
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

#[derive(Clone, Copy)]
pub struct TableStore<'a> {
    conn: &'a Connection,
    def: &'a TableDef,
}

impl<'a> TableStore<'a> {
    pub fn def(&self) -> &'a TableDef {
        self.def
    }

    pub fn name(&self) -> &'a str {
        self.def.name()
    }

    pub fn get_by_primary_key(&self, id: i64) -> Result<Record> {
        self.filter(Predicate::all().eq(self.def.primary_key().name.clone(), id))?
            .first()?
            .ok_or_else(|| {
                WsError::new(WsErrorKind::NotFound)
                    .with_table(self.name())
                    .with_key(id.to_string())
                    .with_message(format!("No record with id {} in {}", id, self.name()))
            })
    }

    /// # Errors
    ///
    /// `NotFound` if no row has the key, `AmbiguousKey` if several do.
    pub fn get_by_business_key(&self, key: &str) -> Result<Record> {
        self.find_by_business_key(key)?.ok_or_else(|| {
            WsError::new(WsErrorKind::NotFound)
                .with_table(self.name())
                .with_key(key)
                .with_message(format!("No record with key {} in {}", key, self.name()))
        })
    }

    /// Like [`get_by_business_key`](Self::get_by_business_key), with absence
    /// as `None`
    pub fn find_by_business_key(&self, key: &str) -> Result<Option<Record>> {
        let predicate = self.business_key_predicate(key)?;
        let filter = self.filter(predicate)?.with_page_size(2);
        let mut matches = filter.iter();
        let first = matches.next().transpose()?;
        if first.is_some() && matches.next().transpose()?.is_some() {
            return Err(WsError::new(WsErrorKind::AmbiguousKey)
                .with_table(self.name())
                .with_key(key)
                .with_message(format!(
                    "More than one record with key {} in {}",
                    key,
                    self.name()
                )));
        }
        Ok(first)
    }

    pub fn filter(&self, predicate: Predicate) -> Result<Filter<'a>> {
        Filter::new(self.conn, self.def, predicate)
    }

    /// Every record of the table
    pub fn all(&self) -> Result<Filter<'a>> {
        self.filter(Predicate::all())
    }

    /// Validate `values` as an insert, or as an update of `existing`
    ///
    /// # Errors
    ///
    /// `Validation` with one message per failing field.
    pub fn prepare(&self, values: &FieldValues, existing: Option<&Record>) -> Result<PreparedWrite> {
        let mut row = validate_values(self.def, values, existing)
            .map_err(|errors| WsError::validation(self.name(), errors))?;

        if let Some(column) = self.def.business_key() {
            let key = row.remove(&column.name).unwrap_or(Value::Null);
            if !key.is_blank() && self.key_taken(&column.name, &key, existing.map(|r| r.id))? {
                let mut errors = FieldErrors::new();
                errors.insert(column.name.clone(), MSG_DUPLICATE_KEY.to_string());
                return Err(WsError::validation(self.name(), errors).with_key(key.render()));
            }
            row.insert(column.name.clone(), key);
        }

        Ok(PreparedWrite {
            table: self.name().to_string(),
            id: existing.map(|r| r.id),
            values: row,
        })
    }

    /// Write a prepared row
    pub fn commit(&self, prepared: PreparedWrite) -> Result<Record> {
        if prepared.table != self.name() {
            return Err(WsError::new(WsErrorKind::Internal).with_message(format!(
                "Write prepared for {} committed to {}",
                prepared.table,
                self.name()
            )));
        }

        let columns: Vec<&str> = self.def.data_columns().map(|c| c.name.as_str()).collect();
        let params: Vec<SqlValue> = columns
            .iter()
            .map(|c| prepared.values.get(*c).map(to_sql).unwrap_or(SqlValue::Null))
            .collect();
        let table = quote_ident(self.name());

        let id = match prepared.id {
            Some(id) => {
                let changed = if columns.is_empty() {
                    self.filter(Predicate::all().eq(self.def.primary_key().name.clone(), id))?
                        .count()?
                } else {
                    let assignments: Vec<String> = columns
                        .iter()
                        .map(|c| format!("{} = ?", quote_ident(c)))
                        .collect();
                    let sql = format!(
                        "UPDATE {} SET {} WHERE {} = ?",
                        table,
                        assignments.join(", "),
                        quote_ident(&self.def.primary_key().name)
                    );
                    let mut params = params;
                    params.push(SqlValue::Integer(id));
                    self.conn
                        .execute(&sql, rusqlite::params_from_iter(params.iter()))
                        .map_err(from_rusqlite)?
                };
                if changed == 0 {
                    return Err(WsError::new(WsErrorKind::NotFound)
                        .with_table(self.name())
                        .with_key(id.to_string())
                        .with_message("Record disappeared before it could be updated"));
                }
                id
            }
            None => {
                let sql = if columns.is_empty() {
                    format!("INSERT INTO {} DEFAULT VALUES", table)
                } else {
                    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
                    let marks = vec!["?"; columns.len()].join(", ");
                    format!("INSERT INTO {} ({}) VALUES ({})", table, names.join(", "), marks)
                };
                self.conn
                    .execute(&sql, rusqlite::params_from_iter(params.iter()))
                    .map_err(from_rusqlite)?;
                self.conn.last_insert_rowid()
            }
        };

        tracing::debug!(table = self.name(), id, update = prepared.id.is_some(), "record written");
        Ok(Record {
            table: prepared.table,
            id,
            values: prepared.values,
        })
    }

    /// Validate and write in one step
    pub fn insert_or_update(&self, values: &FieldValues, existing: Option<&Record>) -> Result<Record> {
        let prepared = self.prepare(values, existing)?;
        self.commit(prepared)
    }

    /// Idempotent; returns the number of rows removed
    pub fn delete_by_primary_key(&self, id: i64) -> Result<usize> {
        self.filter(Predicate::all().eq(self.def.primary_key().name.clone(), id))?
            .delete()
    }

    /// Idempotent; removes every row carrying the key
    pub fn delete_by_business_key(&self, key: &str) -> Result<usize> {
        let predicate = self.business_key_predicate(key)?;
        self.filter(predicate)?.delete()
    }

    fn business_key_predicate(&self, key: &str) -> Result<Predicate> {
        let column = self.def.business_key().ok_or_else(|| {
            WsError::new(WsErrorKind::Validation)
                .with_table(self.name())
                .with_message(format!("Table {} has no business key", self.name()))
        })?;
        let value = column.ty.parse(key).map_err(|problem| {
            let mut errors = FieldErrors::new();
            errors.insert(column.name.clone(), problem);
            WsError::validation(self.name(), errors).with_key(key)
        })?;
        Ok(Predicate::all().eq(column.name.clone(), value))
    }

    fn key_taken(&self, field: &str, key: &Value, own_id: Option<i64>) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} IS ? AND {} IS NOT ? LIMIT 1",
            quote_ident(self.name()),
            quote_ident(field),
            quote_ident(&self.def.primary_key().name)
        );
        let own = own_id.map(SqlValue::Integer).unwrap_or(SqlValue::Null);
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        stmt.exists(rusqlite::params![to_sql(key), own])
            .map_err(from_rusqlite)
    }
}

/// `SELECT` of every column in registry order
pub(crate) fn select_sql(table: &TableDef) -> String {
    let columns: Vec<String> = table.column_names().map(quote_ident).collect();
    format!("SELECT {} FROM {}", columns.join(", "), quote_ident(table.name()))
}

pub(crate) fn load_records(
    conn: &Connection,
    table: &TableDef,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let mut rows = stmt
        .query(rusqlite::params_from_iter(params.iter()))
        .map_err(from_rusqlite)?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(from_rusqlite)? {
        let id: i64 = row.get(0).map_err(from_rusqlite)?;
        let mut values = BTreeMap::new();
        for (i, column) in table.data_columns().enumerate() {
            let raw = row.get_ref(i + 1).map_err(from_rusqlite)?;
            values.insert(column.name.clone(), from_sql(table.name(), column, raw)?);
        }
        records.push(Record {
            table: table.name().to_string(),
            id,
            values,
        });
    }
    Ok(records)
}
