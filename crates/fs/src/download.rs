// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fs_download` and the installer jar fetches: stream an HTTP GET into a
//! `.partial` file, hashing simultaneously, verify on EOF, then rename
//! into place.

use std::path::Path;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::DownloadError;

const PROGRESS_THROTTLE: Duration = Duration::from_millis(250);

/// Optional hashes a download must satisfy.
#[derive(Debug, Clone, Default)]
pub struct ExpectedHashes {
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

/// Download progress, passed to the caller's throttled callback.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub bytes_so_far: u64,
    pub total_bytes: Option<u64>,
}

pub async fn download(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected: &ExpectedHashes,
    mut on_progress: impl FnMut(Progress),
) -> Result<(), DownloadError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(DownloadError::BadStatus(response.status()));
    }
    let total_bytes = response.content_length();

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = dest.with_file_name(format!(".{file_name}.partial"));
    if let Some(parent) = partial.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(&partial).await?;
    let mut sha1_hasher = expected.sha1.is_some().then(Sha1::new);
    let mut sha256_hasher = expected.sha256.is_some().then(Sha256::new);
    let mut written: u64 = 0;
    let mut last_report = Instant::now();

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        if let Some(h) = sha1_hasher.as_mut() {
            h.update(&chunk);
        }
        if let Some(h) = sha256_hasher.as_mut() {
            h.update(&chunk);
        }
        if last_report.elapsed() >= PROGRESS_THROTTLE {
            on_progress(Progress {
                bytes_so_far: written,
                total_bytes,
            });
            last_report = Instant::now();
        }
    }
    file.flush().await?;
    drop(file);

    on_progress(Progress {
        bytes_so_far: written,
        total_bytes,
    });

    if let (Some(hasher), Some(expected_hex)) = (sha1_hasher, expected.sha1.as_ref()) {
        let actual = hex_encode(&hasher.finalize());
        if &actual != expected_hex {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(DownloadError::HashMismatch {
                algo: "sha1",
                expected: expected_hex.clone(),
                actual,
            });
        }
    }
    if let (Some(hasher), Some(expected_hex)) = (sha256_hasher, expected.sha256.as_ref()) {
        let actual = hex_encode(&hasher.finalize());
        if &actual != expected_hex {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(DownloadError::HashMismatch {
                algo: "sha256",
                expected: expected_hex.clone(),
                actual,
            });
        }
    }

    tokio::fs::rename(&partial, dest).await?;
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
