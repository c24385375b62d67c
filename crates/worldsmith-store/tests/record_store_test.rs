#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{default_world, setup_test_db, values};
use worldsmith_core::errors::WsErrorKind;
use worldsmith_core::Value;
use worldsmith_store::{db, Predicate, RecordStore};

#[test]
fn test_write_visible_inside_transaction_only() {
    let world = default_world();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("world.db");
    let mut writer = db::open(&path).unwrap();
    worldsmith_store::migrations::prepare_database(&mut writer, world.schema()).unwrap();
    let reader = db::open(&path).unwrap();

    let tx = db::write_transaction(&mut writer).unwrap();
    let rooms = RecordStore::new(&tx, world.schema()).table("world_room").unwrap();
    rooms.insert_or_update(&values(&[("key", "hall")]), None).unwrap();

    // Same transaction sees the row, another connection does not
    assert!(rooms.find_by_business_key("hall").unwrap().is_some());
    let outside = RecordStore::new(&reader, world.schema()).table("world_room").unwrap();
    assert!(outside.find_by_business_key("hall").unwrap().is_none());

    tx.commit().unwrap();
    assert!(outside.find_by_business_key("hall").unwrap().is_some());
}

#[test]
fn test_choices_and_defaults_from_world() {
    let world = default_world();
    let conn = setup_test_db(&world);
    let exits = RecordStore::new(&conn, world.schema()).table("world_exit").unwrap();

    let err = exits
        .insert_or_update(&values(&[("key", "door"), ("direction", "sideways")]), None)
        .unwrap_err();
    assert_eq!(err.kind(), WsErrorKind::Validation);

    let areas = RecordStore::new(&conn, world.schema()).table("world_area").unwrap();
    let cave = areas.insert_or_update(&values(&[("key", "cave")]), None).unwrap();
    assert_eq!(cave.get("width"), Some(&Value::Integer(10)));
}

#[test]
fn test_table_without_business_key() {
    let world = default_world();
    let conn = setup_test_db(&world);
    let loot = RecordStore::new(&conn, world.schema()).table("loot_entry").unwrap();

    loot.insert_or_update(&values(&[("provider", "bob")]), None).unwrap();
    loot.insert_or_update(&values(&[("provider", "bob")]), None).unwrap();

    let bobs = loot.filter(Predicate::all().eq("provider", "bob")).unwrap();
    assert_eq!(bobs.count().unwrap(), 2);
    assert_eq!(loot.get_by_business_key("bob").unwrap_err().kind(), WsErrorKind::Validation);
}

#[test]
fn test_null_equality_in_filter() {
    let world = default_world();
    let conn = setup_test_db(&world);
    let rooms = RecordStore::new(&conn, world.schema()).table("world_room").unwrap();
    rooms.insert_or_update(&values(&[("key", "limbo")]), None).unwrap();
    rooms
        .insert_or_update(&values(&[("key", "hall"), ("location", "cave")]), None)
        .unwrap();

    let nowhere = rooms.filter(Predicate::all().eq("location", Value::Null)).unwrap();
    let keys: Vec<String> = nowhere
        .records()
        .unwrap()
        .iter()
        .filter_map(|r| r.business_key(rooms.def()))
        .collect();
    assert_eq!(keys, vec!["limbo"]);
}
