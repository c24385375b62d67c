// Integration tests for the area map layout command.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{default_world, field_of, group, setup_test_db};
use worldsmith_core::errors::WsErrorKind;
use worldsmith_core::World;
use worldsmith_engine::commands::map_editor::{save_map_positions, AreaLayout, RoomPosition};
use worldsmith_engine::commands::object_editor::save_entity;

fn seed_map(conn: &mut rusqlite::Connection, world: &World) {
    save_entity(
        conn,
        world,
        &[
            group("object", &[("key", "cave"), ("name", "Cave")]),
            group("world_area", &[("background", "stone.png")]),
        ],
        "AREA",
        None,
    )
    .unwrap();
    for (room, x) in [("hall", "1"), ("pit", "2")] {
        save_entity(
            conn,
            world,
            &[
                group("object", &[("key", room)]),
                group("world_room", &[("location", "cave"), ("x", x), ("y", "1")]),
            ],
            "ROOM",
            None,
        )
        .unwrap();
    }
}

fn layout(width: i64) -> AreaLayout {
    AreaLayout {
        key: "cave".to_string(),
        background: "moss.png".to_string(),
        width,
        height: 12,
    }
}

#[test]
fn test_map_saves_area_canvas_and_room_positions() {
    let world = default_world();
    let mut conn = setup_test_db(&world);
    seed_map(&mut conn, &world);

    let rooms = [
        RoomPosition::at("hall", 4, -3),
        RoomPosition {
            key: "pit".to_string(),
            position: vec![7],
        },
    ];
    let updated = save_map_positions(&mut conn, &world, &layout(30), &rooms).unwrap();

    assert_eq!(updated, 2);
    assert_eq!(field_of(&conn, &world, "world_area", "cave", "background"), "moss.png");
    assert_eq!(field_of(&conn, &world, "world_area", "cave", "width"), "30");
    assert_eq!(field_of(&conn, &world, "world_area", "cave", "height"), "12");
    assert_eq!(field_of(&conn, &world, "world_room", "hall", "x"), "4");
    assert_eq!(field_of(&conn, &world, "world_room", "hall", "y"), "-3");
    // A single coordinate clears the position
    assert_eq!(field_of(&conn, &world, "world_room", "pit", "x"), "");
    assert_eq!(field_of(&conn, &world, "world_room", "pit", "y"), "");
    // Columns outside the layout are kept
    assert_eq!(field_of(&conn, &world, "world_room", "hall", "location"), "cave");
}

#[test]
fn test_map_with_unknown_room_changes_nothing() {
    let world = default_world();
    let mut conn = setup_test_db(&world);
    seed_map(&mut conn, &world);

    let rooms = [RoomPosition::at("hall", 9, 9), RoomPosition::at("attic", 0, 0)];
    let err = save_map_positions(&mut conn, &world, &layout(30), &rooms).unwrap_err();

    assert_eq!(err.kind(), WsErrorKind::NotFound);
    assert_eq!(field_of(&conn, &world, "world_area", "cave", "width"), "10");
    assert_eq!(field_of(&conn, &world, "world_room", "hall", "x"), "1");
}

#[test]
fn test_map_for_unknown_area_is_not_found() {
    let world = default_world();
    let mut conn = setup_test_db(&world);

    let mut area = layout(5);
    area.key = "nowhere".to_string();
    let err = save_map_positions(&mut conn, &world, &area, &[]).unwrap_err();

    assert_eq!(err.kind(), WsErrorKind::NotFound);
}
