//! Bulk import
//!
//! The header row names the columns; the primary-key column is ignored so
//! imported rows get fresh ids. Each row updates the record carrying its
//! business key, or inserts a new one. An import call is one transaction:
//! the first bad row aborts it and nothing is kept.

use super::archive::for_each_entry;
use super::formats::{split_entry_name, Format};
use super::TableCount;
use crate::db::write_transaction;
use crate::errors::{csv_error, from_rusqlite, import_row_error, write_phase_error, Result};
use crate::repo::RecordStore;
use rusqlite::Connection;
use std::io::Read;
use worldsmith_core::errors::{FieldErrors, WsError};
use worldsmith_core::rules::validation::MSG_UNKNOWN_FIELD;
use worldsmith_core::{FieldValues, SchemaRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows read per table, in import order
    pub tables: Vec<TableCount>,
    pub inserted: usize,
    pub updated: usize,
}

impl ImportSummary {
    pub fn rows(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Import one table from a delimited-text stream
///
/// A database failure part-way surfaces as `TransactionFailure`; bad rows
/// keep their own kind. Either way nothing is kept.
pub fn import_table<R: Read>(
    conn: &mut Connection,
    schema: &SchemaRegistry,
    table: &str,
    format: &Format,
    source: R,
) -> Result<ImportSummary> {
    let tx = write_transaction(conn)?;
    let mut summary = ImportSummary::default();
    import_rows(&tx, schema, table, format, source, &mut summary).map_err(write_phase_error)?;
    tx.commit()
        .map_err(|e| WsError::transaction_failure(from_rusqlite(e)))?;
    Ok(summary)
}

/// Import every `{table}.{ext}` entry of a tar.gz archive
pub fn import_archive<R: Read>(
    conn: &mut Connection,
    schema: &SchemaRegistry,
    source: R,
) -> Result<ImportSummary> {
    let tx = write_transaction(conn)?;
    let mut summary = ImportSummary::default();
    for_each_entry(source, |name, data| {
        let (table, format) = split_entry_name(name)?;
        import_rows(&tx, schema, table, format, data, &mut summary)
    })
    .map_err(write_phase_error)?;
    tx.commit()
        .map_err(|e| WsError::transaction_failure(from_rusqlite(e)))?;
    Ok(summary)
}

fn import_rows<R: Read>(
    conn: &Connection,
    schema: &SchemaRegistry,
    table: &str,
    format: &Format,
    source: R,
    summary: &mut ImportSummary,
) -> Result<()> {
    let store = RecordStore::new(conn, schema).table(table)?;
    let def = store.def();

    let mut reader = format.reader(source);
    let headers = reader
        .headers()
        .map_err(|e| csv_error("import", e))?
        .clone();

    let mut unknown = FieldErrors::new();
    for header in headers.iter() {
        if def.column(header).is_none() {
            unknown.insert(header.to_string(), MSG_UNKNOWN_FIELD.to_string());
        }
    }
    if !unknown.is_empty() {
        return Err(WsError::validation(table, unknown)
            .with_op("import")
            .with_message(format!("Header of {} names unknown columns", table)));
    }

    let primary_key = def.primary_key().name.as_str();
    let business_key = def.business_key().map(|c| c.name.as_str());

    let mut rows = 0;
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| import_row_error(table, row, csv_error("import", e)))?;

        let values: FieldValues = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| *header != primary_key)
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();

        let existing = match business_key.and_then(|field| values.get(field)) {
            Some(key) if !key.trim().is_empty() => store
                .find_by_business_key(key)
                .map_err(|e| import_row_error(table, row, e))?,
            _ => None,
        };

        store
            .insert_or_update(&values, existing.as_ref())
            .map_err(|e| import_row_error(table, row, e))?;
        if existing.is_some() {
            summary.updated += 1;
        } else {
            summary.inserted += 1;
        }
        rows += 1;
    }

    tracing::debug!(table, format = format.extension, rows, "table imported");
    summary.tables.push(TableCount {
        table: table.to_string(),
        rows,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::formats::format_for;
    use crate::migrations::prepare_database;
    use worldsmith_core::errors::WsErrorKind;
    use worldsmith_core::{ColumnDef, ColumnType, TableDef, Value};

    fn setup() -> (SchemaRegistry, Connection) {
        let mut key = ColumnDef::new("key", ColumnType::Text);
        key.business_key = true;
        let schema = SchemaRegistry::new(vec![TableDef::new(
            "world_area",
            vec![key, ColumnDef::new("width", ColumnType::Integer)],
        )
        .unwrap()])
        .unwrap();
        let mut conn = crate::db::open_in_memory().unwrap();
        prepare_database(&mut conn, &schema).unwrap();
        (schema, conn)
    }

    #[test]
    fn test_import_inserts_then_updates_by_key() {
        let (schema, mut conn) = setup();
        let csv = format_for("csv").unwrap();

        let first = import_table(&mut conn, &schema, "world_area", csv, &b"id,key,width\n7,cave,3\n"[..])
            .unwrap();
        assert_eq!(first.inserted, 1);

        let second = import_table(&mut conn, &schema, "world_area", csv, &b"id,key,width\n99,cave,5\n"[..])
            .unwrap();
        assert_eq!(second.updated, 1);

        let store = RecordStore::new(&conn, &schema).table("world_area").unwrap();
        let cave = store.get_by_business_key("cave").unwrap();
        assert_eq!(cave.id, 1);
        assert_eq!(cave.get("width"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_bad_row_aborts_whole_import() {
        let (schema, mut conn) = setup();
        let data = b"key,width\ncave,3\nlake,wide\n";

        let err = import_table(&mut conn, &schema, "world_area", format_for("csv").unwrap(), &data[..])
            .unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::Validation);
        assert_eq!(err.table(), Some("world_area"));
        assert!(err.message().contains("data row 2"));

        let store = RecordStore::new(&conn, &schema).table("world_area").unwrap();
        assert_eq!(store.all().unwrap().count().unwrap(), 0);
    }

    #[test]
    fn test_unknown_header_rejected() {
        let (schema, mut conn) = setup();
        let err = import_table(
            &mut conn,
            &schema,
            "world_area",
            format_for("tsv").unwrap(),
            &b"key\tcolour\ncave\tred\n"[..],
        )
        .unwrap_err();
        assert!(err.field_errors().is_some_and(|f| f.contains_key("colour")));
    }

    #[test]
    fn test_column_order_taken_from_header() {
        let (schema, mut conn) = setup();
        import_table(
            &mut conn,
            &schema,
            "world_area",
            format_for("csv").unwrap(),
            &b"width,key\n4,cave\n"[..],
        )
        .unwrap();
        let store = RecordStore::new(&conn, &schema).table("world_area").unwrap();
        assert_eq!(
            store.get_by_business_key("cave").unwrap().get("width"),
            Some(&Value::Integer(4))
        );
    }
}
