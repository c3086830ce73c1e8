// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use elegantmc_core::FakeClock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn seed_instance(sandbox: &Sandbox, instance: &str) {
    let dir = sandbox.root().join("servers").join(instance);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("server.properties"), b"motd=hi").unwrap();
}

#[tokio::test]
async fn creates_zip_archive_and_sidecar_by_default() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox, "s1");

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(1_000));
    let req = BackupRequest::new("s1");

    let outcome = create_backup(&sandbox, &clock, &req, || async {}, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.meta.format, Format::Zip);
    assert_eq!(outcome.meta.created_at_unix, 1_000);
    assert_eq!(outcome.archive_rel, format!("_backups/s1/{}", outcome.meta.filename));
    assert!(sandbox.root().join(&outcome.archive_rel).is_file());
    let meta_path = sandbox
        .root()
        .join("_backups/s1")
        .join(format!("{}.meta.json", outcome.meta.filename));
    assert!(meta_path.is_file());
}

#[tokio::test]
async fn honours_explicit_backup_name_and_comment() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox, "s1");

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(2_000));
    let mut req = BackupRequest::new("s1");
    req.backup_name = Some("b1.zip".to_string());
    req.comment = Some("pre-update".to_string());

    let outcome = create_backup(&sandbox, &clock, &req, || async {}, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.meta.filename, "b1.zip");
    assert_eq!(outcome.meta.comment, Some("pre-update".to_string()));
    assert!(sandbox.root().join("_backups/s1/b1.zip").is_file());
}

#[tokio::test]
async fn tar_gz_format_uses_the_right_extension_and_writer() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox, "s1");

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(3_000));
    let mut req = BackupRequest::new("s1");
    req.format = Format::TarGz;

    let outcome = create_backup(&sandbox, &clock, &req, || async {}, |_| {})
        .await
        .unwrap();

    assert!(outcome.meta.filename.ends_with(".tar.gz"));
    assert_eq!(outcome.meta.format, Format::TarGz);
}

#[tokio::test]
async fn stop_flag_invokes_caller_supplied_callback() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox, "s1");

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(4_000));
    let mut req = BackupRequest::new("s1");
    req.stop = true;

    let stopped = Arc::new(AtomicBool::new(false));
    let stopped_clone = stopped.clone();

    create_backup(
        &sandbox,
        &clock,
        &req,
        || async move { stopped_clone.store(true, Ordering::SeqCst) },
        |_| {},
    )
    .await
    .unwrap();

    assert!(stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn keep_last_prunes_older_backups_after_writing_the_new_one() {
    let tmp = tempdir().unwrap();
    let sandbox = Sandbox::new(tmp.path()).unwrap();
    seed_instance(&sandbox, "s1");

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(100));
    let mut req = BackupRequest::new("s1");
    req.backup_name = Some("first.zip".to_string());
    create_backup(&sandbox, &clock, &req, || async {}, |_| {})
        .await
        .unwrap();

    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(200));
    let mut req = BackupRequest::new("s1");
    req.backup_name = Some("second.zip".to_string());
    req.keep_last = Some(1);
    let outcome = create_backup(&sandbox, &clock, &req, || async {}, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.pruned, vec!["first.zip".to_string()]);
    assert!(!sandbox.root().join("_backups/s1/first.zip").exists());
    assert!(sandbox.root().join("_backups/s1/second.zip").exists());
}
