//! Equality filters over one table
//!
//! A `Filter` is a description of a query, not an open cursor. Iteration
//! pages through matching rows in primary-key order (keyset paging), so it
//! holds no statement between pages and can be restarted by calling `iter`
//! again.

use super::record_store::{load_records, select_sql};
use super::sql_value::to_sql;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::quote_ident;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use std::collections::VecDeque;
use worldsmith_core::errors::{FieldErrors, WsError};
use worldsmith_core::rules::validation::MSG_UNKNOWN_FIELD;
use worldsmith_core::{FieldValues, Record, TableDef, Value};

const DEFAULT_PAGE_SIZE: usize = 256;

/// Conjunction of `field == value` constraints; empty matches every row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<(String, Value)>,
}

impl Predicate {
    /// Match every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// Build a predicate from submitted text, parsed by each column's type
    pub fn from_field_values(table: &TableDef, values: &FieldValues) -> Result<Self> {
        let mut errors = FieldErrors::new();
        let mut predicate = Self::all();
        for (field, raw) in values {
            let Some(column) = table.column(field) else {
                errors.insert(field.clone(), MSG_UNKNOWN_FIELD.to_string());
                continue;
            };
            match column.ty.parse(raw) {
                Ok(value) => predicate = predicate.eq(field.clone(), value),
                Err(problem) => {
                    errors.insert(field.clone(), problem);
                }
            }
        }
        if errors.is_empty() {
            Ok(predicate)
        } else {
            Err(WsError::validation(table.name(), errors))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }
}

/// Matching rows of one table
pub struct Filter<'a> {
    conn: &'a Connection,
    table: &'a TableDef,
    predicate: Predicate,
    page_size: usize,
}

impl<'a> Filter<'a> {
    pub(crate) fn new(conn: &'a Connection, table: &'a TableDef, predicate: Predicate) -> Result<Self> {
        let mut errors = FieldErrors::new();
        for (field, _) in predicate.clauses() {
            if table.column(field).is_none() {
                errors.insert(field.clone(), MSG_UNKNOWN_FIELD.to_string());
            }
        }
        if !errors.is_empty() {
            return Err(WsError::validation(table.name(), errors).with_op("filter"));
        }
        Ok(Self {
            conn,
            table,
            predicate,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Rows fetched per query while iterating
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Iterate matching records in primary-key order
    pub fn iter(&self) -> FilterIter<'_, 'a> {
        FilterIter {
            filter: self,
            after: None,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// All matching records in primary-key order
    pub fn records(&self) -> Result<Vec<Record>> {
        self.iter().collect()
    }

    /// The matching record with the lowest primary key
    pub fn first(&self) -> Result<Option<Record>> {
        Ok(self.page(None, 1)?.into_iter().next())
    }

    pub fn count(&self) -> Result<usize> {
        let (clause, params) = self.where_clause(None);
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(self.table.name()),
            clause
        );
        let count: i64 = self
            .conn
            .query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| {
                row.get(0)
            })
            .map_err(from_rusqlite)?;
        Ok(count as usize)
    }

    /// Set `field` to `value` on every matching row; returns the number of
    /// rows changed
    ///
    /// Writes the value as given, without row validation.
    pub fn update(&self, field: &str, value: impl Into<Value>) -> Result<usize> {
        let writable = self
            .table
            .column(field)
            .is_some_and(|column| !column.primary_key);
        if !writable {
            let mut errors = FieldErrors::new();
            errors.insert(field.to_string(), MSG_UNKNOWN_FIELD.to_string());
            return Err(WsError::validation(self.table.name(), errors).with_op("filter_update"));
        }

        let (clause, mut params) = self.where_clause(None);
        let sql = format!(
            "UPDATE {} SET {} = ?{}",
            quote_ident(self.table.name()),
            quote_ident(field),
            clause
        );
        params.insert(0, to_sql(&value.into()));
        self.conn
            .execute(&sql, rusqlite::params_from_iter(params.iter()))
            .map_err(from_rusqlite)
    }

    /// Delete every matching row; returns the number of rows removed
    pub fn delete(&self) -> Result<usize> {
        let (clause, params) = self.where_clause(None);
        let sql = format!("DELETE FROM {}{}", quote_ident(self.table.name()), clause);
        self.conn
            .execute(&sql, rusqlite::params_from_iter(params.iter()))
            .map_err(from_rusqlite)
    }

    fn where_clause(&self, after: Option<i64>) -> (String, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        for (field, value) in self.predicate.clauses() {
            // IS: NULL-safe equality
            conditions.push(format!("{} IS ?", quote_ident(field)));
            params.push(to_sql(value));
        }
        if let Some(after) = after {
            conditions.push(format!("{} > ?", quote_ident(&self.table.primary_key().name)));
            params.push(SqlValue::Integer(after));
        }
        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), params)
        }
    }

    fn page(&self, after: Option<i64>, limit: usize) -> Result<Vec<Record>> {
        let (clause, mut params) = self.where_clause(after);
        let sql = format!(
            "{}{} ORDER BY {} LIMIT ?",
            select_sql(self.table),
            clause,
            quote_ident(&self.table.primary_key().name)
        );
        params.push(SqlValue::Integer(limit as i64));
        load_records(self.conn, self.table, &sql, &params)
    }
}

/// Lazy iterator over a filter's records
pub struct FilterIter<'f, 'a> {
    filter: &'f Filter<'a>,
    after: Option<i64>,
    buffer: VecDeque<Record>,
    done: bool,
}

impl Iterator for FilterIter<'_, '_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            match self.filter.page(self.after, self.filter.page_size) {
                Ok(page) => {
                    self.done = page.len() < self.filter.page_size;
                    self.buffer.extend(page);
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        let record = self.buffer.pop_front()?;
        self.after = Some(record.id);
        Some(Ok(record))
    }
}
