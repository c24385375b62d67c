#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use worldsmith_core::errors::WsErrorKind;
use worldsmith_core::{load_world_file, load_world_str, ColumnType, Value};

fn default_world_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../worlds/default.yaml"))
}

#[test]
fn test_default_world_loads() {
    // Given the shipped world definition
    // When it is loaded
    let world = load_world_file(default_world_path()).unwrap();

    // Then every table and type is registered
    assert!(world.schema().contains("loot_entry"));
    assert_eq!(
        world.types().tables_for("WORLD_NPC").unwrap(),
        ["object", "character", "world_npc"]
    );
    assert_eq!(world.discriminator().table, "object");

    let odds = world.schema().table("loot_entry").unwrap().column("odds").unwrap();
    assert_eq!(odds.ty, ColumnType::Float);
    assert_eq!(odds.default, Value::Float(1.0));
}

#[test]
fn test_default_world_cascades() {
    let world = load_world_file(default_world_path()).unwrap();
    let types = world.types();

    let area: Vec<String> = world
        .cascades()
        .rewrites_for("AREA", types)
        .iter()
        .map(|f| format!("{}.{}", f.table, f.field))
        .collect();
    assert_eq!(area, vec!["world_room.location"]);

    let room: Vec<String> = world
        .cascades()
        .rewrites_for("ROOM", types)
        .iter()
        .map(|f| format!("{}.{}", f.table, f.field))
        .collect();
    assert_eq!(
        room,
        vec![
            "world_exit.location",
            "world_exit.destination",
            "world_object.location",
            "world_npc.location"
        ]
    );

    assert!(world.cascades().rewrites_for("WORLD_NPC", types).is_empty());
}

#[test]
fn test_type_cycle_is_cycle_detected() {
    let yaml = r#"
tables:
  - name: object
    columns:
      - { name: key, business_key: true }
      - { name: element_type }
types:
  - { key: A, parent: B, tables: [object] }
  - { key: B, parent: A, tables: [object] }
discriminator: { table: object, field: element_type }
cascades: []
"#;
    let err = load_world_str(yaml).unwrap_err();
    assert_eq!(err.kind(), WsErrorKind::CycleDetected);
}

#[test]
fn test_custom_primary_key_name() {
    let yaml = r#"
tables:
  - name: object
    primary_key: object_id
    columns:
      - { name: key, business_key: true }
      - { name: element_type }
discriminator: { table: object, field: element_type }
cascades: []
"#;
    let world = load_world_str(yaml).unwrap();
    let table = world.schema().table("object").unwrap();
    assert_eq!(table.primary_key().name, "object_id");
    assert_eq!(table.column_names().collect::<Vec<_>>(), ["object_id", "key", "element_type"]);
}
