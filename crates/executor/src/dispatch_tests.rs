// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use base64::Engine;
use elegantmc_core::{FakeClock, SystemClock};
use elegantmc_frp::Supervisor as FrpSupervisor;
use elegantmc_fs::sandbox::Sandbox;
use elegantmc_mc::Supervisor as McSupervisor;
use serde_json::json;

use super::*;

fn make_dispatcher(root: &std::path::Path) -> Dispatcher {
    let sandbox = Sandbox::new(root).expect("sandbox root");
    let mc = Arc::new(McSupervisor::new(vec!["java".to_string()], Arc::new(|_, _, _| {})));
    let frp = Arc::new(FrpSupervisor::new(
        "frpc".to_string(),
        Arc::new(|_, _, _| {}),
        Arc::new(SystemClock) as Arc<dyn elegantmc_core::Clock>,
    ));
    Dispatcher::new(
        sandbox,
        mc,
        frp,
        Arc::new(FakeClock::new(1_700_000_000)),
        InstallUrls::default(),
        Arc::new(|_, _| {}),
    )
}

#[tokio::test]
async fn unknown_command_reports_the_expected_error_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher.dispatch("no_such_command", json!({})).await;

    assert!(!result.ok);
    assert_eq!(result.error.as_deref(), Some("unknown command: no_such_command"));
}

#[tokio::test]
async fn ping_reports_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher.dispatch("ping", json!({})).await;

    assert!(result.ok);
    assert_eq!(result.output, Some(json!({ "pong": true })));
}

#[tokio::test]
async fn fs_read_rejects_a_path_that_escapes_the_sandbox() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher
        .dispatch("fs_read", json!({ "path": "../etc/passwd" }))
        .await;

    assert!(!result.ok);
}

#[tokio::test]
async fn fs_write_then_fs_read_round_trips_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let content_b64 = base64::engine::general_purpose::STANDARD.encode(b"hello world");
    let write = dispatcher
        .dispatch(
            "fs_write",
            json!({ "path": "servers/s1/note.txt", "content_b64": content_b64 }),
        )
        .await;
    assert!(write.ok);

    let read = dispatcher
        .dispatch("fs_read", json!({ "path": "servers/s1/note.txt" }))
        .await;
    assert!(read.ok);
    let output = read.output.expect("output");
    assert_eq!(output["content_b64"], json!(content_b64));
}

#[tokio::test]
async fn mc_start_rejects_a_malformed_instance_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher
        .dispatch(
            "mc_start",
            json!({ "instance_id": "has a space", "jar_path": "server.jar" }),
        )
        .await;

    assert!(!result.ok);
}

#[tokio::test]
async fn frpc_install_rejects_a_short_sha256() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher
        .dispatch(
            "frpc_install",
            json!({ "url": "https://example.com/frpc", "sha256": "abc" }),
        )
        .await;

    assert!(!result.ok);
}

#[tokio::test]
async fn schedule_get_on_a_fresh_sandbox_is_an_empty_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher.dispatch("schedule_get", json!({})).await;

    assert!(result.ok);
    assert_eq!(result.output, Some(json!([])));
}

#[tokio::test]
async fn net_check_port_reports_closed_for_a_port_nothing_listens_on() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher
        .dispatch("net_check_port", json!({ "host": "127.0.0.1", "port": 1 }))
        .await;

    assert!(result.ok);
    assert_eq!(result.output, Some(json!({ "open": false })));
}

#[tokio::test]
async fn diagnostics_bundle_reports_zero_scheduled_tasks_on_a_fresh_sandbox() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dispatcher = make_dispatcher(dir.path());

    let result = dispatcher.dispatch("diagnostics_bundle", json!({})).await;

    assert!(result.ok);
    let output = result.output.expect("output");
    assert_eq!(output["scheduleTaskCount"], json!(0));
}
