//! Area map layout.
//!
//! The map view edits one area's canvas (background image and size) and
//! drags its rooms around. Both land in a single transaction: the area row
//! and every room row are validated first, then written together.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use worldsmith_core::errors::WsError;
use worldsmith_core::{log_op_end, log_op_error, log_op_start};
use worldsmith_core::{FieldValues, World};
use worldsmith_store::db::write_transaction;
use worldsmith_store::errors::{from_rusqlite, Result};
use worldsmith_store::{PreparedWrite, RecordStore};

pub const AREA_TABLE: &str = "world_area";
pub const ROOM_TABLE: &str = "world_room";

/// Canvas settings of an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaLayout {
    pub key: String,
    pub background: String,
    pub width: i64,
    pub height: i64,
}

/// A room's place on its area's map
///
/// `position` is `[x, y]`; fewer than two coordinates clears the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPosition {
    pub key: String,
    #[serde(default)]
    pub position: Vec<i64>,
}

impl RoomPosition {
    pub fn at(key: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            key: key.into(),
            position: vec![x, y],
        }
    }

    fn coordinates(&self) -> Option<(i64, i64)> {
        match self.position.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Save an area's canvas and the positions of its rooms
///
/// ## Returns
///
/// Number of rooms updated
///
/// ## Errors
///
/// - `NotFound`: the area or one of the rooms does not exist
/// - `Validation`: a row failed validation (nothing is written)
/// - `TransactionFailure`: the write phase failed and was rolled back
pub fn save_map_positions(
    conn: &mut Connection,
    world: &World,
    area: &AreaLayout,
    rooms: &[RoomPosition],
) -> Result<usize> {
    log_op_start!(
        "save_map_positions",
        area = area.key.as_str(),
        rooms = rooms.len()
    );
    let start = Instant::now();

    let updated = save_map_positions_impl(conn, world, area, rooms).map_err(|e| {
        log_op_error!(
            "save_map_positions",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "save_map_positions",
        duration_ms = start.elapsed().as_millis() as u64,
        rooms = updated
    );

    Ok(updated)
}

fn save_map_positions_impl(
    conn: &mut Connection,
    world: &World,
    area: &AreaLayout,
    rooms: &[RoomPosition],
) -> Result<usize> {
    let tx = write_transaction(conn)?;
    let store = RecordStore::new(&tx, world.schema());

    let areas = store.table(AREA_TABLE)?;
    let mut canvas = FieldValues::new();
    canvas.insert("background".to_string(), area.background.clone());
    canvas.insert("width".to_string(), area.width.to_string());
    canvas.insert("height".to_string(), area.height.to_string());
    let existing = areas.get_by_business_key(&area.key)?;
    let mut prepared = vec![areas.prepare(&canvas, Some(&existing))?];

    let room_table = store.table(ROOM_TABLE)?;
    for room in rooms {
        let (x, y) = match room.coordinates() {
            Some((x, y)) => (x.to_string(), y.to_string()),
            None => (String::new(), String::new()),
        };
        let mut values = FieldValues::new();
        values.insert("x".to_string(), x);
        values.insert("y".to_string(), y);
        let existing = room_table.get_by_business_key(&room.key)?;
        prepared.push(room_table.prepare(&values, Some(&existing))?);
    }

    write_all(&store, prepared).map_err(WsError::transaction_failure)?;
    tx.commit()
        .map_err(|e| WsError::transaction_failure(from_rusqlite(e)))?;

    Ok(rooms.len())
}

fn write_all(store: &RecordStore<'_>, prepared: Vec<PreparedWrite>) -> Result<()> {
    for write in prepared {
        store.table(write.table())?.commit(write)?;
    }
    Ok(())
}
