//! Store-wide counters kept in the `system_data` row

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// Take the next object index
///
/// Must run inside the write transaction of the save that uses the index, so
/// the increment commits or rolls back together with it.
pub fn next_object_index(conn: &Connection) -> Result<i64> {
    let index: i64 = conn
        .query_row(
            "SELECT object_index FROM system_data WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;

    conn.execute(
        "UPDATE system_data SET object_index = ?1, updated_at = ?2 WHERE id = 1",
        rusqlite::params![index + 1, chrono::Utc::now().timestamp()],
    )
    .map_err(from_rusqlite)?;

    tracing::debug!(object_index = index, "object index allocated");
    Ok(index)
}

/// The index the next allocation will return
pub fn peek_object_index(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT object_index FROM system_data WHERE id = 1",
        [],
        |row| row.get(0),
    )
    .map_err(from_rusqlite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;

    #[test]
    fn test_indexes_increase_from_zero() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        assert_eq!(next_object_index(&conn).unwrap(), 0);
        assert_eq!(next_object_index(&conn).unwrap(), 1);
        assert_eq!(peek_object_index(&conn).unwrap(), 2);
    }

    #[test]
    fn test_rolled_back_allocation_is_reused() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        {
            let tx = conn.transaction().unwrap();
            assert_eq!(next_object_index(&tx).unwrap(), 0);
        }
        assert_eq!(next_object_index(&conn).unwrap(), 0);
    }
}
