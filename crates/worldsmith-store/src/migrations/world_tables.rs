//! World table creation
//!
//! One SQL table per registered table. The primary key is an autoincrement
//! integer so deleted ids are never reused. Business keys get a plain
//! (non-unique) index; uniqueness is a validation rule, and duplicate rows
//! written by other tools must stay detectable as ambiguous.

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use worldsmith_core::{SchemaRegistry, TableDef};

/// Quote an identifier for interpolation into SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE IF NOT EXISTS` statement for a registered table
pub fn create_table_sql(table: &TableDef) -> String {
    let mut columns = Vec::with_capacity(table.columns().len());
    columns.push(format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        quote_ident(&table.primary_key().name)
    ));
    for column in table.data_columns() {
        columns.push(format!(
            "{} {}",
            quote_ident(&column.name),
            column.ty.sql_type()
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(table.name()),
        columns.join(", ")
    )
}

fn index_sql(table: &TableDef) -> Vec<String> {
    table
        .data_columns()
        .filter(|c| c.business_key || c.is_reference())
        .map(|c| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote_ident(&format!("idx_{}_{}", table.name(), c.name)),
                quote_ident(table.name()),
                quote_ident(&c.name)
            )
        })
        .collect()
}

/// Create every registered table that does not exist yet
pub fn ensure_world_tables(conn: &mut Connection, schema: &SchemaRegistry) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    for table in schema.tables() {
        tx.execute(&create_table_sql(table), [])
            .map_err(from_rusqlite)?;
        for sql in index_sql(table) {
            tx.execute(&sql, []).map_err(from_rusqlite)?;
        }
    }
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(tables = schema.tables().len(), "world tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldsmith_core::{ColumnDef, ColumnType};

    fn loot_table() -> TableDef {
        let mut object = ColumnDef::new("object", ColumnType::Text);
        object.references = Some("object".to_string());
        TableDef::new(
            "loot_entry",
            vec![object, ColumnDef::new("odds", ColumnType::Float)],
        )
        .unwrap()
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            create_table_sql(&loot_table()),
            "CREATE TABLE IF NOT EXISTS \"loot_entry\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"object\" TEXT, \"odds\" REAL)"
        );
    }

    #[test]
    fn test_reference_columns_indexed() {
        let sql = index_sql(&loot_table());
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("\"idx_loot_entry_object\""));
    }

    #[test]
    fn test_ensure_world_tables_idempotent() {
        let schema = SchemaRegistry::new(vec![loot_table()]).unwrap();
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_world_tables(&mut conn, &schema).unwrap();
        ensure_world_tables(&mut conn, &schema).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM \"loot_entry\"", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
