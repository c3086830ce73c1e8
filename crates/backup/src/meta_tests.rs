// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn format_serializes_to_spec_strings() {
    assert_eq!(serde_json::to_string(&Format::Zip).unwrap(), "\"zip\"");
    assert_eq!(
        serde_json::to_string(&Format::TarGz).unwrap(),
        "\"tar.gz\""
    );
}

#[test]
fn write_then_read_round_trips() {
    let tmp = tempdir().unwrap();
    let meta_path = tmp.path().join("b1.zip.meta.json");
    let meta = BackupMeta::new("s1", "b1.zip", Format::Zip, 1_000, 3, 4096, Some("pre-update".to_string()));
    meta.write(&meta_path).unwrap();

    let loaded = BackupMeta::read(&meta_path).unwrap();
    assert_eq!(loaded.instance, "s1");
    assert_eq!(loaded.filename, "b1.zip");
    assert_eq!(loaded.format, Format::Zip);
    assert_eq!(loaded.file_count, 3);
    assert_eq!(loaded.byte_count, 4096);
    assert_eq!(loaded.comment, Some("pre-update".to_string()));
    assert_eq!(loaded.schema_version, 1);
}

#[test]
fn extension_matches_format() {
    assert_eq!(Format::Zip.extension(), "zip");
    assert_eq!(Format::TarGz.extension(), "tar.gz");
}
