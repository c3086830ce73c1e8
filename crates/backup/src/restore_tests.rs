// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn seed_instance(sandbox: &Sandbox) {
    let dir = sandbox.root().join("servers/s1");
    std::fs::create_dir_all(dir.join("world")).unwrap();
    std::fs::write(dir.join("server.properties"), b"motd=original").unwrap();
    std::fs::write(dir.join("world/level.dat"), b"original-bytes").unwrap();
}

#[tokio::test]
async fn restores_instance_tree_byte_for_byte() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox);

    let backups_dir = sandbox.root().join("_backups/s1");
    std::fs::create_dir_all(&backups_dir).unwrap();
    archive::zip_dir(&sandbox.root().join("servers/s1"), &backups_dir.join("b1.zip"), |_| {}).unwrap();

    std::fs::write(sandbox.root().join("servers/s1/server.properties"), b"garbage").unwrap();

    restore(&sandbox, "s1", "_backups/s1/b1.zip", || async {})
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(sandbox.root().join("servers/s1/server.properties")).unwrap(),
        b"motd=original"
    );
    assert_eq!(
        std::fs::read(sandbox.root().join("servers/s1/world/level.dat")).unwrap(),
        b"original-bytes"
    );
}

#[tokio::test]
async fn infers_tar_gz_extractor_from_extension() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox);

    let backups_dir = sandbox.root().join("_backups/s1");
    std::fs::create_dir_all(&backups_dir).unwrap();
    archive::tar_gz_dir(
        &sandbox.root().join("servers/s1"),
        &backups_dir.join("b1.tar.gz"),
        |_| {},
    )
    .unwrap();

    std::fs::write(sandbox.root().join("servers/s1/server.properties"), b"garbage").unwrap();

    restore(&sandbox, "s1", "_backups/s1/b1.tar.gz", || async {})
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(sandbox.root().join("servers/s1/server.properties")).unwrap(),
        b"motd=original"
    );
}

#[tokio::test]
async fn rejects_zip_path_that_escapes_the_sandbox() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox);

    let err = restore(&sandbox, "s1", "../outside.zip", || async {})
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::Sandbox(_)));
}

#[tokio::test]
async fn fails_when_archive_does_not_exist() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox);

    let err = restore(&sandbox, "s1", "_backups/s1/missing.zip", || async {})
        .await
        .unwrap_err();
    assert!(matches!(err, BackupError::NotFound(_)));
}

#[tokio::test]
async fn invokes_stop_callback_before_wiping_instance_directory() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox);

    let backups_dir = sandbox.root().join("_backups/s1");
    std::fs::create_dir_all(&backups_dir).unwrap();
    archive::zip_dir(&sandbox.root().join("servers/s1"), &backups_dir.join("b1.zip"), |_| {}).unwrap();

    let stopped = Arc::new(AtomicBool::new(false));
    let stopped_clone = stopped.clone();
    restore(&sandbox, "s1", "_backups/s1/b1.zip", || async move {
        stopped_clone.store(true, Ordering::SeqCst)
    })
    .await
    .unwrap();

    assert!(stopped.load(Ordering::SeqCst));
}
