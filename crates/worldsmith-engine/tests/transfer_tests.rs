// Integration tests for bulk transfer commands.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{count_rows, default_world, field_of, group, setup_test_db};
use std::fs;
use tempfile::TempDir;
use worldsmith_core::errors::WsErrorKind;
use worldsmith_engine::commands::object_editor::save_entity;
use worldsmith_engine::commands::transfer::{
    export_all, export_all_to_file, export_resources_to_file, export_table, import_archive,
    import_table,
};
use worldsmith_store::bulk::ExportOptions;

#[test]
fn test_unsupported_format_fails_before_writing() {
    let world = default_world();
    let conn = setup_test_db(&world);

    let mut sink = Vec::new();
    let err = export_table(&conn, &world, "object", "xlsx", &mut sink).unwrap_err();
    assert_eq!(err.kind(), WsErrorKind::UnsupportedFormat);
    assert!(sink.is_empty());

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("world.tar.gz");
    let err = export_all_to_file(&conn, &world, "xlsx", &ExportOptions::default(), &target)
        .unwrap_err();
    assert_eq!(err.kind(), WsErrorKind::UnsupportedFormat);
    assert!(!target.exists());
}

#[test]
fn test_exported_world_imports_into_fresh_store() {
    let world = default_world();
    let mut source = setup_test_db(&world);
    save_entity(
        &mut source,
        &world,
        &[
            group("object", &[("key", "hall"), ("name", "Great, \"old\" hall")]),
            group("world_room", &[("location", "cave"), ("x", "3")]),
        ],
        "ROOM",
        None,
    )
    .unwrap();

    let mut archive = Vec::new();
    let counts = export_all(&source, &world, "tsv", &ExportOptions::default(), &mut archive).unwrap();
    assert_eq!(counts.len(), world.types().all_tables().len());

    let mut target = setup_test_db(&world);
    let summary = import_archive(&mut target, &world, &archive[..]).unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(field_of(&target, &world, "object", "hall", "name"), "Great, \"old\" hall");
    assert_eq!(field_of(&target, &world, "world_room", "hall", "x"), "3");
}

#[test]
fn test_import_table_updates_by_business_key() {
    let world = default_world();
    let mut conn = setup_test_db(&world);
    save_entity(
        &mut conn,
        &world,
        &[group("object", &[("key", "cave")]), group("world_area", &[("width", "4")])],
        "AREA",
        None,
    )
    .unwrap();

    let data = "id,key,background,width,height\n99,cave,,20,20\n,forest,trees.png,,\n";
    let summary = import_table(&mut conn, &world, "world_area", "csv", data.as_bytes()).unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(field_of(&conn, &world, "world_area", "cave", "width"), "20");
    assert_eq!(count_rows(&conn, "world_area"), 2);
}

#[test]
fn test_failing_row_aborts_whole_import() {
    let world = default_world();
    let mut conn = setup_test_db(&world);

    let data = "key,width\nmeadow,5\nswamp,deep\n";
    let err = import_table(&mut conn, &world, "world_area", "csv", data.as_bytes()).unwrap_err();

    assert_eq!(err.kind(), WsErrorKind::Validation);
    assert!(err.message().contains("row 2"));
    assert_eq!(count_rows(&conn, "world_area"), 0);
}

#[test]
fn test_database_failure_mid_import_rolls_back() {
    let world = default_world();
    let mut source = setup_test_db(&world);
    save_entity(
        &mut source,
        &world,
        &[
            group("object", &[("key", "bob")]),
            group("character", &[]),
            group("world_npc", &[("hostile", "true")]),
        ],
        "WORLD_NPC",
        None,
    )
    .unwrap();
    let mut archive = Vec::new();
    export_all(&source, &world, "csv", &ExportOptions::default(), &mut archive).unwrap();

    let mut target = setup_test_db(&world);
    target.execute("DROP TABLE world_npc", []).unwrap();
    let err = import_archive(&mut target, &world, &archive[..]).unwrap_err();

    assert_eq!(err.kind(), WsErrorKind::TransactionFailure);
    assert_eq!(count_rows(&target, "object"), 0);
    assert_eq!(count_rows(&target, "character"), 0);
}

#[test]
fn test_resource_export_skips_hidden_files() {
    let resources = TempDir::new().unwrap();
    fs::create_dir_all(resources.path().join("images/.cache")).unwrap();
    fs::write(resources.path().join("images/cave.png"), b"png").unwrap();
    fs::write(resources.path().join("images/.cache/thumb.png"), b"tmp").unwrap();
    fs::write(resources.path().join(".DS_Store"), b"junk").unwrap();
    fs::write(resources.path().join("readme.txt"), b"hello").unwrap();

    let out = TempDir::new().unwrap();
    let target = out.path().join("resources.tar.gz");
    let files = export_resources_to_file(resources.path(), &target).unwrap();

    assert_eq!(files, 2);
    assert!(target.exists());
}
