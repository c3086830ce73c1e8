// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use elegantmc_core::{FakeClock, InstanceId};
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;

/// A fake `frpc` that ignores `-c <config>` and just blocks until killed,
/// standing in for the real binary in tests.
fn fake_frpc(dir: &std::path::Path) -> String {
    let path = dir.join("fake-frpc.sh");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "#!/bin/sh\nexec sleep 300").unwrap();
    drop(file);
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.display().to_string()
}

fn noop_sink() -> LogSink {
    Arc::new(|_id, _stream, _line| {})
}

fn proxy_config(name: &str) -> ProxyConfig {
    ProxyConfig {
        name: name.to_string(),
        server_addr: "frp.example.com".to_string(),
        server_port: 7000,
        token: None,
        local_ip: None,
        local_port: 25565,
        remote_port: 25566,
    }
}

#[tokio::test]
async fn start_writes_config_and_reports_running_proxy() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let workdir = tmp.path().join("s1");
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(1_000)));
    let id = InstanceId::parse("s1").unwrap();

    let state = sup
        .start(&id, workdir.clone(), proxy_config("s1"))
        .await
        .unwrap();

    assert_eq!(state.proxy_name, "s1");
    assert_eq!(state.remote_port, 25566);
    assert_eq!(state.started_unix, 1_000);
    assert!(workdir.join("s1.toml").is_file());
    assert!(sup.is_running(&id));

    sup.stop(&id).await.unwrap();
}

#[tokio::test]
async fn start_twice_fails_with_already_running() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let workdir = tmp.path().join("s1");
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(0)));
    let id = InstanceId::parse("s1").unwrap();

    sup.start(&id, workdir.clone(), proxy_config("s1"))
        .await
        .unwrap();
    let err = sup
        .start(&id, workdir, proxy_config("s1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FrpError::AlreadyRunning(_)));

    sup.stop(&id).await.unwrap();
}

#[tokio::test]
async fn stop_removes_proxy_from_snapshot() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let workdir = tmp.path().join("s1");
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(0)));
    let id = InstanceId::parse("s1").unwrap();

    sup.start(&id, workdir, proxy_config("s1")).await.unwrap();
    sup.stop(&id).await.unwrap();

    assert!(!sup.is_running(&id));
    assert!(sup.snapshot().is_empty());
}

#[tokio::test]
async fn stopping_one_proxy_does_not_affect_another() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(0)));
    let s1 = InstanceId::parse("s1").unwrap();
    let s2 = InstanceId::parse("s2").unwrap();

    sup.start(&s1, tmp.path().join("s1"), proxy_config("s1"))
        .await
        .unwrap();
    sup.start(&s2, tmp.path().join("s2"), proxy_config("s2"))
        .await
        .unwrap();

    sup.stop(&s1).await.unwrap();

    assert!(!sup.is_running(&s1));
    assert!(sup.is_running(&s2));

    sup.stop(&s2).await.unwrap();
}

#[tokio::test]
async fn stop_all_terminates_every_proxy() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(0)));
    let s1 = InstanceId::parse("s1").unwrap();
    let s2 = InstanceId::parse("s2").unwrap();

    sup.start(&s1, tmp.path().join("s1"), proxy_config("s1"))
        .await
        .unwrap();
    sup.start(&s2, tmp.path().join("s2"), proxy_config("s2"))
        .await
        .unwrap();

    sup.stop_all().await;

    assert!(sup.snapshot().is_empty());
}

#[tokio::test]
async fn restart_uses_recorded_config() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let workdir = tmp.path().join("s1");
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(0)));
    let id = InstanceId::parse("s1").unwrap();

    sup.start(&id, workdir, proxy_config("s1")).await.unwrap();
    let state = sup.restart(&id).await.unwrap();

    assert_eq!(state.remote_port, 25566);
    sup.stop(&id).await.unwrap();
}

#[tokio::test]
async fn stop_unknown_proxy_fails() {
    let tmp = tempdir().unwrap();
    let frpc = fake_frpc(tmp.path());
    let sup = Supervisor::new(frpc, noop_sink(), Arc::new(FakeClock::new(0)));
    let id = InstanceId::parse("ghost").unwrap();

    assert!(matches!(
        sup.stop(&id).await.unwrap_err(),
        FrpError::Unknown(_)
    ));
}
