//! Snapshot files feeding the in-memory store

use pretty_assertions::assert_eq;
use rollcall_sheet::{CellRange, CellUpdate, CellValue, InMemoryStore, SheetSnapshot, TabularStore};

#[tokio::test]
async fn seeded_sheet_survives_a_write_and_dump() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    std::fs::write(
        &seed,
        r#"{ "sheet": "Sheet1", "cells": { "A4": "@alice", "A5": "bob", "F1": "Sep 7", "F2": 50 } }"#,
    )
    .unwrap();

    let store = InMemoryStore::from_snapshot(&SheetSnapshot::load(&seed).unwrap()).unwrap();

    let header = store
        .read_range("Sheet1", CellRange::column_span("F".parse().unwrap(), 1, 3))
        .await
        .unwrap();
    assert_eq!(header.get(0, 0), &CellValue::text("Sep 7"));
    assert_eq!(header.get(1, 0).as_number(), Some(50.0));
    assert!(header.get(2, 0).is_blank());

    store
        .batch_write(
            "Sheet1",
            &[
                CellUpdate::new("F4".parse().unwrap(), 0.0),
                CellUpdate::new("F5".parse().unwrap(), 0.0),
            ],
        )
        .await
        .unwrap();

    let out = dir.path().join("out.json");
    store.snapshot("Sheet1").save(&out).unwrap();
    let reloaded = SheetSnapshot::load(&out).unwrap();

    assert_eq!(reloaded.cells.len(), 6);
    assert_eq!(reloaded.cells.get("F5"), Some(&CellValue::number(0.0)));
    assert_eq!(reloaded.cells.get("A4"), Some(&CellValue::text("@alice")));
}

#[test]
fn bad_reference_in_snapshot_is_rejected() {
    let snapshot = SheetSnapshot::new("Sheet1").with_cell("A0", "x");
    assert!(InMemoryStore::from_snapshot(&snapshot).is_err());
}
