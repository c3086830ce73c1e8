// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn seed_backup(dir: &Path, name: &str, created_at_unix: i64) {
    std::fs::write(dir.join(name), b"fake archive bytes").unwrap();
    let meta = BackupMeta::new("s1", name, crate::meta::Format::Zip, created_at_unix, 1, 18, None);
    meta.write(&dir.join(format!("{name}.meta.json"))).unwrap();
}

#[test]
fn keeps_newest_n_and_removes_the_rest() {
    let tmp = tempdir().unwrap();
    seed_backup(tmp.path(), "b1.zip", 100);
    seed_backup(tmp.path(), "b2.zip", 200);
    seed_backup(tmp.path(), "b3.zip", 300);

    let removed = prune_keep_last(tmp.path(), 2).unwrap();

    assert_eq!(removed, vec!["b1.zip".to_string()]);
    assert!(!tmp.path().join("b1.zip").exists());
    assert!(!tmp.path().join("b1.zip.meta.json").exists());
    assert!(tmp.path().join("b2.zip").exists());
    assert!(tmp.path().join("b3.zip").exists());
}

#[test]
fn keep_last_of_zero_is_rejected() {
    let tmp = tempdir().unwrap();
    let err = prune_keep_last(tmp.path(), 0).unwrap_err();
    assert!(matches!(err, BackupError::KeepLastOutOfRange));
}

#[test]
fn keep_last_over_max_is_rejected() {
    let tmp = tempdir().unwrap();
    let err = prune_keep_last(tmp.path(), 1001).unwrap_err();
    assert!(matches!(err, BackupError::KeepLastOutOfRange));
}

#[test]
fn missing_backups_dir_prunes_nothing() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("does-not-exist");
    let removed = prune_keep_last(&missing, 5).unwrap();
    assert!(removed.is_empty());
}

#[test]
fn fewer_backups_than_keep_last_removes_nothing() {
    let tmp = tempdir().unwrap();
    seed_backup(tmp.path(), "b1.zip", 100);

    let removed = prune_keep_last(tmp.path(), 5).unwrap();
    assert!(removed.is_empty());
    assert!(tmp.path().join("b1.zip").exists());
}
