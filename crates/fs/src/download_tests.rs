// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sha2::{Digest, Sha256};
use tempfile::tempdir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

#[test]
fn hex_encode_matches_known_digest() {
    let hash = Sha256::digest(b"hello");
    let encoded = hex_encode(&hash);
    assert_eq!(
        encoded,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

/// Spawns a one-shot plain-HTTP server that serves `body` for any request
/// and returns its base URL.
async fn serve_once(body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.write_all(body).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn download_writes_body_and_verifies_sha256() {
    let body: &'static [u8] = b"minecraft server jar bytes";
    let url = serve_once(body).await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("server.jar");
    let client = reqwest::Client::new();
    let expected_sha256 = hex_encode(&Sha256::digest(body));

    download(
        &client,
        &url,
        &dest,
        &ExpectedHashes {
            sha1: None,
            sha256: Some(expected_sha256),
        },
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
}

#[tokio::test]
async fn download_rejects_hash_mismatch_and_leaves_no_partial() {
    let body: &'static [u8] = b"unexpected bytes";
    let url = serve_once(body).await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("server.jar");
    let client = reqwest::Client::new();

    let err = download(
        &client,
        &url,
        &dest,
        &ExpectedHashes {
            sha1: None,
            sha256: Some("0".repeat(64)),
        },
        |_| {},
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DownloadError::HashMismatch { algo: "sha256", .. }));
    assert!(!dest.exists());
    assert!(!dir.path().join(".server.jar.partial").exists());
}
