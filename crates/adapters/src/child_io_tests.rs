// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Stdio;
use tokio::process::Command;

#[tokio::test]
async fn forwards_stdout_lines_in_order() {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg("printf 'one\\ntwo\\nthree\\n'")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let stdout = child.stdout.take().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = spawn_line_forwarder(ChildStream::Stdout, stdout, tx);

    let mut lines = Vec::new();
    while let Some(ChildLine { line, .. }) = rx.recv().await {
        lines.push(line);
    }
    handle.await.unwrap();
    child.wait().await.unwrap();

    assert_eq!(lines, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn tags_lines_with_the_given_stream() {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg("printf 'err\\n' 1>&2")
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let stderr = child.stderr.take().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_line_forwarder(ChildStream::Stderr, stderr, tx).await.unwrap();
    child.wait().await.unwrap();

    let received = rx.recv().await.unwrap();
    assert_eq!(received.stream, ChildStream::Stderr);
    assert_eq!(received.line, "err");
}

#[tokio::test]
async fn task_exits_once_receiver_is_dropped() {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg("sleep 5 && printf 'late\\n'")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let stdout = child.stdout.take().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let handle = spawn_line_forwarder(ChildStream::Stdout, stdout, tx);

    tokio::time::timeout(std::time::Duration::from_secs(2), handle)
        .await
        .expect("forwarder should exit promptly once the receiver is dropped")
        .unwrap();
    let _ = child.kill().await;
}
