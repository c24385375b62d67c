#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{default_world, setup_test_db, values};
use proptest::prelude::*;
use worldsmith_store::bulk::{export_table, format_for, import_table};
use worldsmith_store::RecordStore;

/// Areas with unique keys and awkward text: quotes, both delimiters, newlines
fn areas() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[ -~\t\n]{0,24}", any::<i64>()), 0..8)
}

fn rows_without_ids(delimiter: u8, bytes: &[u8]) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(bytes)
        .records()
        .map(|r| r.unwrap().iter().skip(1).map(str::to_string).collect())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_table_survives_export_and_import(areas in areas(), tabs in any::<bool>()) {
        let world = default_world();
        let format = format_for(if tabs { "tsv" } else { "csv" }).unwrap();

        let source = setup_test_db(&world);
        let store = RecordStore::new(&source, world.schema());
        for (i, (background, width)) in areas.iter().enumerate() {
            let key = format!("area_{}", i);
            let width = width.to_string();
            store
                .table("world_area")
                .unwrap()
                .insert_or_update(
                    &values(&[
                        ("key", key.as_str()),
                        ("background", background.as_str()),
                        ("width", width.as_str()),
                    ]),
                    None,
                )
                .unwrap();
        }

        let mut exported = Vec::new();
        let rows = export_table(&source, world.schema(), "world_area", format, &mut exported).unwrap();
        prop_assert_eq!(rows, areas.len());

        let mut target = setup_test_db(&world);
        let summary = import_table(&mut target, world.schema(), "world_area", format, &exported[..]).unwrap();
        prop_assert_eq!(summary.inserted, areas.len());

        let mut again = Vec::new();
        export_table(&target, world.schema(), "world_area", format, &mut again).unwrap();
        prop_assert_eq!(
            rows_without_ids(format.delimiter, &exported),
            rows_without_ids(format.delimiter, &again)
        );

        let imported = RecordStore::new(&target, world.schema()).table("world_area").unwrap();
        for (i, (background, _)) in areas.iter().enumerate() {
            let record = imported.get_by_business_key(&format!("area_{}", i)).unwrap();
            prop_assert_eq!(record.get("background").map(|v| v.render()), Some(background.clone()));
        }
    }
}
