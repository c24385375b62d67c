//! Single-table form commands.
//!
//! Direct record CRUD for tables that are not split across a type, such as
//! loot entries. Records are addressed by primary key or by an equality
//! filter given as submitted field text.

use crate::commands::forms::TableForm;
use rusqlite::Connection;
use std::time::Instant;
use worldsmith_core::errors::WsErrorKind;
use worldsmith_core::{log_op_end, log_op_error, log_op_start};
use worldsmith_core::{FieldValues, World};
use worldsmith_store::db::write_transaction;
use worldsmith_store::errors::{from_rusqlite, Result};
use worldsmith_store::{Filter, Predicate, RecordStore, TableStore};

/// Form for the first record matching `filter`
///
/// An empty filter, or one matching nothing, yields a template.
///
/// ## Errors
///
/// - `UnknownTable`: table not registered
/// - `Validation`: the filter names unknown fields or unparsable values
pub fn query_form(
    conn: &Connection,
    world: &World,
    table: &str,
    filter: &FieldValues,
) -> Result<TableForm> {
    log_op_start!("query_form", table = table);
    let start = Instant::now();

    let result = query_form_impl(conn, world, table, filter).map_err(|e| {
        log_op_error!(
            "query_form",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "query_form",
        duration_ms = start.elapsed().as_millis() as u64,
        record_id = result.record_id.unwrap_or_default()
    );

    Ok(result)
}

fn query_form_impl(
    conn: &Connection,
    world: &World,
    table: &str,
    filter: &FieldValues,
) -> Result<TableForm> {
    let store = RecordStore::new(conn, world.schema()).table(table)?;
    if filter.is_empty() {
        return Ok(TableForm::template(store.def()));
    }
    let record = matching(&store, filter)?.first()?;
    Ok(match record {
        Some(record) => TableForm::from_record(store.def(), &record),
        None => TableForm::template(store.def()),
    })
}

/// One form per record matching `filter`, or a single template when none do
///
/// ## Errors
///
/// - `UnknownTable`: table not registered
/// - `Validation`: the filter names unknown fields or unparsable values
pub fn query_forms(
    conn: &Connection,
    world: &World,
    table: &str,
    filter: &FieldValues,
) -> Result<Vec<TableForm>> {
    log_op_start!("query_forms", table = table);
    let start = Instant::now();

    let forms = query_forms_impl(conn, world, table, filter).map_err(|e| {
        log_op_error!(
            "query_forms",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "query_forms",
        duration_ms = start.elapsed().as_millis() as u64,
        forms = forms.len()
    );

    Ok(forms)
}

fn query_forms_impl(
    conn: &Connection,
    world: &World,
    table: &str,
    filter: &FieldValues,
) -> Result<Vec<TableForm>> {
    let store = RecordStore::new(conn, world.schema()).table(table)?;
    let matches = matching(&store, filter)?;
    let mut forms = Vec::new();
    for record in matches.iter() {
        forms.push(TableForm::from_record(store.def(), &record?));
    }
    if forms.is_empty() {
        forms.push(TableForm::template(store.def()));
    }
    Ok(forms)
}

/// Insert a record, or update the one with `record_id`
///
/// A `record_id` that no longer exists is treated as an insert.
///
/// ## Returns
///
/// Primary key of the written record
///
/// ## Errors
///
/// - `UnknownTable`: table not registered
/// - `Validation`: values failed validation (nothing is written)
pub fn save_form(
    conn: &mut Connection,
    world: &World,
    table: &str,
    values: &FieldValues,
    record_id: Option<i64>,
) -> Result<i64> {
    log_op_start!("save_form", table = table, record_id = record_id.unwrap_or_default());
    let start = Instant::now();

    let id = save_form_impl(conn, world, table, values, record_id).map_err(|e| {
        log_op_error!(
            "save_form",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "save_form",
        duration_ms = start.elapsed().as_millis() as u64,
        record_id = id
    );

    Ok(id)
}

fn save_form_impl(
    conn: &mut Connection,
    world: &World,
    table: &str,
    values: &FieldValues,
    record_id: Option<i64>,
) -> Result<i64> {
    let tx = write_transaction(conn)?;
    let store = RecordStore::new(&tx, world.schema()).table(table)?;

    let existing = match record_id {
        Some(id) => match store.get_by_primary_key(id) {
            Ok(record) => Some(record),
            Err(e) if e.kind() == WsErrorKind::NotFound => None,
            Err(e) => return Err(e),
        },
        None => None,
    };
    let record = store.insert_or_update(values, existing.as_ref())?;

    tx.commit().map_err(from_rusqlite)?;
    Ok(record.id)
}

/// Delete a record by primary key; deleting an absent record is not an error
///
/// ## Errors
///
/// - `UnknownTable`: table not registered
pub fn delete_record(conn: &Connection, world: &World, table: &str, record_id: i64) -> Result<usize> {
    log_op_start!("delete_record", table = table, record_id = record_id);
    let start = Instant::now();

    let removed = RecordStore::new(conn, world.schema())
        .table(table)
        .and_then(|store| store.delete_by_primary_key(record_id))
        .map_err(|e| {
            log_op_error!(
                "delete_record",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "delete_record",
        duration_ms = start.elapsed().as_millis() as u64,
        removed = removed
    );

    Ok(removed)
}

/// Delete every record matching `filter`; an empty filter matches all rows
///
/// ## Returns
///
/// Number of records removed
///
/// ## Errors
///
/// - `UnknownTable`: table not registered
/// - `Validation`: the filter names unknown fields or unparsable values
pub fn delete_records(
    conn: &Connection,
    world: &World,
    table: &str,
    filter: &FieldValues,
) -> Result<usize> {
    log_op_start!("delete_records", table = table);
    let start = Instant::now();

    let removed = RecordStore::new(conn, world.schema())
        .table(table)
        .and_then(|store| matching(&store, filter)?.delete())
        .map_err(|e| {
            log_op_error!(
                "delete_records",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "delete_records",
        duration_ms = start.elapsed().as_millis() as u64,
        removed = removed
    );

    Ok(removed)
}

fn matching<'a>(store: &TableStore<'a>, filter: &FieldValues) -> Result<Filter<'a>> {
    store.filter(Predicate::from_field_values(store.def(), filter)?)
}
