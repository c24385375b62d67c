//! Composite object editor.
//!
//! A logical entity is stored as one record per table of its type, all
//! carrying the same business key. This module reads such an entity as a
//! list of forms, saves it back atomically, renames its key (rewriting
//! cross-references per the world's cascade rules) and deletes it.
//!
//! ## Write protocol
//!
//! Every mutating command runs in one `IMMEDIATE` transaction:
//! 1. Resolve the effective key (synthesizing one from the object index)
//! 2. Validate every group against its table
//! 3. Write every group, then rewrite cross-references on a rename
//! 4. Commit
//!
//! Nothing is written until step 2 has passed for all groups. A failure in
//! step 3 or 4 rolls everything back and surfaces as `TransactionFailure`.

use crate::commands::forms::{Choice, FieldDescriptor, TableForm, WIDGET_SELECT};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use worldsmith_core::errors::{WsError, WsErrorKind};
use worldsmith_core::{log_op_end, log_op_error, log_op_start};
use worldsmith_core::{FieldValues, TableDef, TypeInfo, Value, World};
use worldsmith_store::db::write_transaction;
use worldsmith_store::errors::{from_rusqlite, Result};
use worldsmith_store::repo::system_data::next_object_index;
use worldsmith_store::{Predicate, PreparedWrite, RecordStore, TableStore};

/// Submitted values for one table of an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupValues {
    pub table: String,
    pub values: FieldValues,
}

impl GroupValues {
    pub fn new(table: impl Into<String>, values: FieldValues) -> Self {
        Self {
            table: table.into(),
            values,
        }
    }
}

/// Read an entity as one form per table of its type
///
/// ## Arguments
///
/// - `base`: type whose subtypes are offered in the type selector
/// - `type_key`: concrete type; read from the stored record when `None`
///   and a key is given, `base` otherwise
/// - `business_key`: entity to load; `None` returns empty templates
///
/// ## Errors
///
/// - `UnknownType`: no type under `base`, or `type_key` unregistered or
///   not under `base`
/// - `NotFound`: the key has no record in the type's first table
/// - `AmbiguousKey`: the key matches several records of one table
pub fn query_entity(
    conn: &Connection,
    world: &World,
    base: &str,
    type_key: Option<&str>,
    business_key: Option<&str>,
) -> Result<Vec<TableForm>> {
    log_op_start!("query_entity", base = base);
    let start = Instant::now();

    let forms = query_entity_impl(conn, world, base, type_key, business_key).map_err(|e| {
        log_op_error!(
            "query_entity",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "query_entity",
        duration_ms = start.elapsed().as_millis() as u64,
        tables = forms.len()
    );

    Ok(forms)
}

fn query_entity_impl(
    conn: &Connection,
    world: &World,
    base: &str,
    type_key: Option<&str>,
    business_key: Option<&str>,
) -> Result<Vec<TableForm>> {
    let types = world.types();
    let candidates = types.candidates_under(base);
    if candidates.is_empty() {
        return Err(WsError::unknown_type(base).with_op("query_entity"));
    }

    let store = RecordStore::new(conn, world.schema());
    let business_key = business_key.filter(|k| !k.is_empty());
    let type_key = match (type_key.filter(|t| !t.is_empty()), business_key) {
        (Some(type_key), _) => type_key.to_string(),
        (None, Some(key)) => stored_type(&store, world, key)?.unwrap_or_else(|| base.to_string()),
        (None, None) => base.to_string(),
    };

    let tables = types.tables_for(&type_key)?;
    if !types.is_descendant(&type_key, base) {
        return Err(WsError::unknown_type(type_key.as_str())
            .with_op("query_entity")
            .with_message(format!("Type {} is not a {}", type_key, base)));
    }
    let mut forms = Vec::with_capacity(tables.len());
    for (position, name) in tables.iter().enumerate() {
        let table = store.table(name)?;
        let form = match business_key {
            None => TableForm::template(table.def()),
            Some(key) if position == 0 => {
                TableForm::from_record(table.def(), &table.get_by_business_key(key)?)
            }
            // The entity may have just changed to a type with more tables
            Some(key) => match table.find_by_business_key(key)? {
                Some(record) => TableForm::from_record(table.def(), &record),
                None => keyed_template(table.def(), key),
            },
        };
        forms.push(form);
    }

    if let Some(first) = forms.first_mut() {
        add_type_selector(first, world, &type_key, &candidates);
    }

    Ok(forms)
}

/// Save an entity from per-table values
///
/// The business key comes from the first group; when it is blank the
/// existing key is kept, and a new entity gets `{type_key}_auto_{n}`. When
/// the key changes, cross-references are rewritten in the same transaction.
///
/// ## Returns
///
/// The entity's effective business key
///
/// ## Errors
///
/// - `Validation`: empty group list, a table submitted twice or not used by
///   the type, or a group failed validation (nothing is written)
/// - `AmbiguousKey`: `existing_key` matches several records of one table
/// - `UnknownType` / `UnknownTable`: unregistered type or group table
/// - `TransactionFailure`: the write phase failed and was rolled back
pub fn save_entity(
    conn: &mut Connection,
    world: &World,
    groups: &[GroupValues],
    type_key: &str,
    existing_key: Option<&str>,
) -> Result<String> {
    log_op_start!(
        "save_entity",
        type_key = type_key,
        groups = groups.len(),
        existing_key = existing_key.unwrap_or_default()
    );
    let start = Instant::now();

    let key = save_entity_impl(conn, world, groups, type_key, existing_key).map_err(|e| {
        log_op_error!(
            "save_entity",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "save_entity",
        duration_ms = start.elapsed().as_millis() as u64,
        key = key.as_str()
    );

    Ok(key)
}

fn save_entity_impl(
    conn: &mut Connection,
    world: &World,
    groups: &[GroupValues],
    type_key: &str,
    existing_key: Option<&str>,
) -> Result<String> {
    let first = groups.first().ok_or_else(|| {
        WsError::new(WsErrorKind::Validation)
            .with_op("save_entity")
            .with_key(type_key)
            .with_message("Nothing to save: no tables were submitted")
    })?;
    check_group_tables(groups, world.types().tables_for(type_key)?, type_key)?;
    let existing_key = existing_key.filter(|k| !k.is_empty());

    let tx = write_transaction(conn)?;
    let store = RecordStore::new(&tx, world.schema());

    let key_field = key_column(&store.table(&first.table)?)?;
    let key = match first.values.get(key_field).filter(|k| !k.is_empty()) {
        Some(submitted) => submitted.clone(),
        None => match existing_key {
            Some(existing) => existing.to_string(),
            None => format!("{}_auto_{}", type_key, next_object_index(&tx)?),
        },
    };

    let discriminator = world.discriminator();
    let mut prepared = Vec::with_capacity(groups.len());
    for group in groups {
        let table = store.table(&group.table)?;
        let mut values = group.values.clone();
        values.insert(key_column(&table)?.to_string(), key.clone());
        if group.table == discriminator.table {
            values.insert(discriminator.field.clone(), type_key.to_string());
        }

        let existing = match existing_key {
            Some(old) => table.find_by_business_key(old)?,
            None => None,
        };
        prepared.push(table.prepare(&values, existing.as_ref())?);
    }

    write_entity(&store, world, type_key, existing_key, &key, prepared)
        .map_err(WsError::transaction_failure)?;
    tx.commit()
        .map_err(|e| WsError::transaction_failure(from_rusqlite(e)))?;

    Ok(key)
}

/// Each group must name a distinct table of the type
fn check_group_tables(groups: &[GroupValues], tables: &[String], type_key: &str) -> Result<()> {
    let mut seen: Vec<&str> = Vec::with_capacity(groups.len());
    for group in groups {
        let problem = if !tables.contains(&group.table) {
            format!("Table {} does not belong to type {}", group.table, type_key)
        } else if seen.contains(&group.table.as_str()) {
            format!("Table {} was submitted more than once", group.table)
        } else {
            seen.push(&group.table);
            continue;
        };
        return Err(WsError::new(WsErrorKind::Validation)
            .with_op("save_entity")
            .with_table(group.table.clone())
            .with_key(type_key)
            .with_message(problem));
    }
    Ok(())
}

fn write_entity(
    store: &RecordStore<'_>,
    world: &World,
    type_key: &str,
    old_key: Option<&str>,
    new_key: &str,
    prepared: Vec<PreparedWrite>,
) -> Result<()> {
    for write in prepared {
        let table = store.table(write.table())?;
        table.commit(write)?;
    }
    if let Some(old_key) = old_key.filter(|old| *old != new_key) {
        rename_references(store, world, type_key, old_key, new_key)?;
    }
    Ok(())
}

/// Rewrite every cross-reference to `old_key` into `new_key`
///
/// Only the columns named by cascade rules whose category `type_key`
/// belongs to are touched; the entity's own records are not renamed.
///
/// ## Returns
///
/// Number of referencing rows rewritten
///
/// ## Errors
///
/// - `UnknownType`: `type_key` is not registered
/// - `Validation`: `new_key` is empty
/// - `TransactionFailure`: a rewrite failed and everything was rolled back
pub fn update_object_key(
    conn: &mut Connection,
    world: &World,
    type_key: &str,
    old_key: &str,
    new_key: &str,
) -> Result<usize> {
    log_op_start!(
        "update_object_key",
        type_key = type_key,
        old_key = old_key,
        new_key = new_key
    );
    let start = Instant::now();

    let rewritten = update_object_key_impl(conn, world, type_key, old_key, new_key).map_err(|e| {
        log_op_error!(
            "update_object_key",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "update_object_key",
        duration_ms = start.elapsed().as_millis() as u64,
        rewritten = rewritten
    );

    Ok(rewritten)
}

fn update_object_key_impl(
    conn: &mut Connection,
    world: &World,
    type_key: &str,
    old_key: &str,
    new_key: &str,
) -> Result<usize> {
    world.types().tables_for(type_key)?;
    if new_key.is_empty() {
        return Err(WsError::new(WsErrorKind::Validation)
            .with_op("update_object_key")
            .with_key(old_key)
            .with_message("The new key must not be empty"));
    }
    if old_key == new_key {
        return Ok(0);
    }

    let tx = write_transaction(conn)?;
    let store = RecordStore::new(&tx, world.schema());
    let rewritten = rename_references(&store, world, type_key, old_key, new_key)
        .map_err(WsError::transaction_failure)?;
    tx.commit()
        .map_err(|e| WsError::transaction_failure(from_rusqlite(e)))?;
    Ok(rewritten)
}

fn rename_references(
    store: &RecordStore<'_>,
    world: &World,
    type_key: &str,
    old_key: &str,
    new_key: &str,
) -> Result<usize> {
    let mut rewritten = 0;
    for target in world.cascades().rewrites_for(type_key, world.types()) {
        let changed = store
            .table(&target.table)?
            .filter(Predicate::all().eq(target.field.clone(), old_key))?
            .update(&target.field, new_key)?;
        tracing::debug!(
            table = target.table.as_str(),
            field = target.field.as_str(),
            changed,
            "references renamed"
        );
        rewritten += changed;
    }
    Ok(rewritten)
}

/// Delete an entity from every table any type under `base` uses
///
/// Without `base`, the entity's stored type is used. Tables without a row
/// for the key are skipped, so deleting an absent entity under an explicit
/// base removes nothing and succeeds.
///
/// ## Returns
///
/// Number of records removed
///
/// ## Errors
///
/// - `NotFound`: no `base` given and the key has no root record
/// - `UnknownType`: `base` is not registered
/// - `TransactionFailure`: a delete failed and everything was rolled back
pub fn delete_entity(
    conn: &mut Connection,
    world: &World,
    business_key: &str,
    base: Option<&str>,
) -> Result<usize> {
    log_op_start!(
        "delete_entity",
        key = business_key,
        base = base.unwrap_or_default()
    );
    let start = Instant::now();

    let removed = delete_entity_impl(conn, world, business_key, base).map_err(|e| {
        log_op_error!(
            "delete_entity",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "delete_entity",
        duration_ms = start.elapsed().as_millis() as u64,
        removed = removed
    );

    Ok(removed)
}

fn delete_entity_impl(
    conn: &mut Connection,
    world: &World,
    business_key: &str,
    base: Option<&str>,
) -> Result<usize> {
    let tx = write_transaction(conn)?;
    let store = RecordStore::new(&tx, world.schema());

    let base = match base.filter(|b| !b.is_empty()) {
        Some(base) => base.to_string(),
        None => stored_type(&store, world, business_key)?.ok_or_else(|| {
            WsError::new(WsErrorKind::NotFound)
                .with_op("delete_entity")
                .with_key(business_key)
                .with_message("The entity has no stored type")
        })?,
    };

    let types = world.types();
    if !types.contains(&base) {
        return Err(WsError::unknown_type(base).with_op("delete_entity"));
    }

    let mut tables: Vec<&str> = Vec::new();
    for type_key in types.candidates_under(&base).keys() {
        for table in types.tables_for(type_key)? {
            if !tables.contains(&table.as_str()) {
                tables.push(table.as_str());
            }
        }
    }

    let removed = delete_rows(&store, &tables, business_key).map_err(WsError::transaction_failure)?;
    tx.commit()
        .map_err(|e| WsError::transaction_failure(from_rusqlite(e)))?;
    Ok(removed)
}

fn delete_rows(store: &RecordStore<'_>, tables: &[&str], business_key: &str) -> Result<usize> {
    let mut removed = 0;
    for table in tables {
        removed += store.table(table)?.delete_by_business_key(business_key)?;
    }
    Ok(removed)
}

/// Type key recorded in the entity's root-table record
fn stored_type(store: &RecordStore<'_>, world: &World, business_key: &str) -> Result<Option<String>> {
    let discriminator = world.discriminator();
    let record = store
        .table(&discriminator.table)?
        .get_by_business_key(business_key)?;
    Ok(record
        .get(&discriminator.field)
        .map(Value::render)
        .filter(|type_key| !type_key.is_empty()))
}

fn key_column<'a>(table: &TableStore<'a>) -> Result<&'a str> {
    table
        .def()
        .business_key()
        .map(|column| column.name.as_str())
        .ok_or_else(|| {
            WsError::new(WsErrorKind::Validation)
                .with_table(table.name())
                .with_message(format!("Table {} has no business key", table.name()))
        })
}

fn keyed_template(table: &TableDef, business_key: &str) -> TableForm {
    let mut form = TableForm::template(table);
    if let Some(column) = table.business_key() {
        if let Some(field) = form.field_mut(&column.name) {
            field.value = business_key.to_string();
        }
    }
    form
}

fn add_type_selector(
    form: &mut TableForm,
    world: &World,
    type_key: &str,
    candidates: &BTreeMap<String, TypeInfo>,
) {
    let choices: Vec<Choice> = candidates
        .iter()
        .map(|(key, info)| Choice::new(key.clone(), info.display_label()))
        .collect();
    let discriminator = world.discriminator();

    if form.table == discriminator.table {
        if let Some(field) = form.field_mut(&discriminator.field) {
            field.make_select(type_key, choices);
            return;
        }
    }

    form.fields.push(FieldDescriptor {
        name: discriminator.field.clone(),
        label: "Type".to_string(),
        help_text: String::new(),
        widget: WIDGET_SELECT.to_string(),
        hidden: false,
        disabled: false,
        value: type_key.to_string(),
        choices: Some(choices),
        references: None,
    });
}
