// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn zip_then_unzip_round_trips_a_tree() {
    let src = tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("sub")).unwrap();
    std::fs::write(src.path().join("top.txt"), b"top").unwrap();
    std::fs::write(src.path().join("sub/nested.txt"), b"nested").unwrap();

    let archive_dir = tempdir().unwrap();
    let zip_path = archive_dir.path().join("out.zip");
    zip_dir(src.path(), &zip_path).unwrap();

    let dest = tempdir().unwrap();
    unzip(&zip_path, dest.path()).unwrap();

    assert_eq!(std::fs::read(dest.path().join("top.txt")).unwrap(), b"top");
    assert_eq!(
        std::fs::read(dest.path().join("sub/nested.txt")).unwrap(),
        b"nested"
    );
}

#[test]
fn clean_entry_name_rejects_escaping_parent_refs() {
    assert!(clean_entry_name("../escape").is_none());
    assert!(clean_entry_name("a/../../escape").is_none());
}

#[test]
fn clean_entry_name_rejects_absolute() {
    assert!(clean_entry_name("/etc/passwd").is_none());
}

#[test]
fn clean_entry_name_allows_internal_parent_refs() {
    assert_eq!(
        clean_entry_name("a/b/../c").unwrap(),
        PathBuf::from("a").join("c")
    );
}

#[test]
fn common_top_level_dir_detects_shared_prefix() {
    let names = vec![
        "pack/a.txt".to_string(),
        "pack/sub/b.txt".to_string(),
    ];
    assert_eq!(common_top_level_dir(&names), Some(PathBuf::from("pack")));
}

#[test]
fn common_top_level_dir_is_none_when_entries_diverge() {
    let names = vec!["pack/a.txt".to_string(), "other/b.txt".to_string()];
    assert_eq!(common_top_level_dir(&names), None);
}

#[test]
fn common_top_level_dir_is_none_for_a_single_top_level_file() {
    let names = vec!["server.jar".to_string()];
    assert_eq!(common_top_level_dir(&names), None);
}

#[test]
fn unzip_extracts_a_single_top_level_file_archive() {
    let archive_dir = tempdir().unwrap();
    let zip_path = archive_dir.path().join("out.zip");
    let file = File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("server.jar", options).unwrap();
    writer.write_all(b"jar bytes").unwrap();
    writer.finish().unwrap();

    let dest = tempdir().unwrap();
    unzip(&zip_path, dest.path()).unwrap();

    assert_eq!(
        std::fs::read(dest.path().join("server.jar")).unwrap(),
        b"jar bytes"
    );
}

#[test]
fn unzip_strips_shared_top_level_directory() {
    let src = tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("pack")).unwrap();
    std::fs::write(src.path().join("pack/server.properties"), b"x").unwrap();

    let archive_dir = tempdir().unwrap();
    let zip_path = archive_dir.path().join("out.zip");
    zip_dir(src.path(), &zip_path).unwrap();

    let dest = tempdir().unwrap();
    unzip(&zip_path, dest.path()).unwrap();

    assert!(dest.path().join("server.properties").exists());
    assert!(!dest.path().join("pack").exists());
}

#[test]
fn unzip_never_writes_outside_dest_even_with_crafted_names() {
    // Build a zip containing a path-traversal entry by hand.
    let archive_dir = tempdir().unwrap();
    let zip_path = archive_dir.path().join("evil.zip");
    let file = File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("../../escape.txt", options).unwrap();
    writer.write_all(b"pwned").unwrap();
    writer.finish().unwrap();

    let dest = tempdir().unwrap();
    let result = unzip(&zip_path, dest.path());
    assert!(result.is_err());
    assert!(!dest.path().join("../../escape.txt").exists());
}
