// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn load_on_missing_file_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("panel_binding.json");

    let loaded = load(&path).await.expect("load");
    assert!(loaded.is_none());
}

#[tokio::test]
async fn save_then_load_round_trips_the_panel_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("panel_binding.json");

    save(&path, "panel-7").await.expect("save");
    let loaded = load(&path).await.expect("load").expect("present");

    assert_eq!(loaded.panel_id, "panel-7");
}
