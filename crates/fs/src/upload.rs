// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fs_upload_{begin,chunk,commit,abort}`. Sessions are owned exclusively
//! by this manager, keyed by a random 128-bit ID.

use std::collections::HashMap;
use std::path::PathBuf;

use base64::Engine;
use parking_lot::Mutex;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::UploadError;
use crate::sandbox::Sandbox;

const MAX_CONCURRENT_SESSIONS: usize = 4;
const MAX_CHUNK_BYTES: usize = 512 * 1024;
const MAX_FILE_BYTES: u64 = 512 * 1024 * 1024;
const SESSION_TTL_SECS: i64 = 30 * 60;

struct Session {
    dest_rel: String,
    dest_abs: PathBuf,
    tmp_abs: PathBuf,
    file: File,
    hasher: Sha256,
    bytes_written: u64,
    started_at: i64,
    last_at: i64,
}

#[derive(Default)]
pub struct UploadManager {
    sessions: Mutex<HashMap<String, Session>>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CommitOutcome {
    pub path: String,
    pub bytes: u64,
    pub sha256: String,
}

impl UploadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `dest_rel`, ensures its parent exists, opens a
    /// `.<name>.upload-<id>.partial` file for exclusive create, and
    /// returns the new session's ID. Eagerly reaps any session whose
    /// `last_at` is older than the TTL.
    pub async fn begin(
        &self,
        sandbox: &Sandbox,
        dest_rel: &str,
        now_unix: i64,
    ) -> Result<String, UploadError> {
        self.reap_stale(now_unix);

        if self.sessions.lock().len() >= MAX_CONCURRENT_SESSIONS {
            return Err(UploadError::TooManySessions(MAX_CONCURRENT_SESSIONS));
        }

        let dest_abs = sandbox.resolve_non_root(dest_rel)?;
        if let Some(parent) = dest_abs.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let id = {
            let mut bytes = [0u8; 16];
            rand::rng().fill(&mut bytes);
            hex_encode(&bytes)
        };
        let file_name = dest_abs
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_abs = dest_abs.with_file_name(format!(".{file_name}.upload-{id}.partial"));

        let file = File::options()
            .write(true)
            .create_new(true)
            .open(&tmp_abs)
            .await?;

        self.sessions.lock().insert(
            id.clone(),
            Session {
                dest_rel: dest_rel.to_string(),
                dest_abs,
                tmp_abs,
                file,
                hasher: Sha256::new(),
                bytes_written: 0,
                started_at: now_unix,
                last_at: now_unix,
            },
        );
        Ok(id)
    }

    /// Decodes `b64`, rejects chunks over the per-chunk/per-file caps,
    /// appends to the partial file, and folds the bytes into a running
    /// SHA-256.
    pub async fn chunk(&self, id: &str, b64: &str, now_unix: i64) -> Result<(), UploadError> {
        let decoded = base64::engine::general_purpose::STANDARD.decode(b64)?;
        if decoded.len() > MAX_CHUNK_BYTES {
            return Err(UploadError::ChunkTooLarge {
                got: decoded.len(),
                cap: MAX_CHUNK_BYTES,
            });
        }

        // Take ownership of the file handle to await outside the lock, put
        // it back afterward; only one chunk per session is ever in flight
        // because the Panel's command dispatch is per-request on this ID.
        let mut file = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get_mut(id)
                .ok_or_else(|| UploadError::UnknownSession(id.to_string()))?;
            let projected = session.bytes_written + decoded.len() as u64;
            if projected > MAX_FILE_BYTES {
                return Err(UploadError::FileTooLarge {
                    got: projected,
                    cap: MAX_FILE_BYTES,
                });
            }
            session.hasher.update(&decoded);
            session.bytes_written = projected;
            session.last_at = now_unix;
            session.file.try_clone().await?
        };
        file.write_all(&decoded).await?;
        file.flush().await?;
        Ok(())
    }

    /// Closes the file, verifies the optional client hash, and renames
    /// the partial into place (best-effort overwrite: rename, then
    /// remove+rename on failure).
    pub async fn commit(
        &self,
        id: &str,
        expected_sha256: Option<&str>,
    ) -> Result<CommitOutcome, UploadError> {
        let (dest_rel, dest_abs, tmp_abs, bytes, sha256) = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .remove(id)
                .ok_or_else(|| UploadError::UnknownSession(id.to_string()))?;
            let sha256 = hex_encode(&session.hasher.finalize());
            (
                session.dest_rel,
                session.dest_abs,
                session.tmp_abs,
                session.bytes_written,
                sha256,
            )
        };

        if let Some(expected) = expected_sha256 {
            if expected != sha256 {
                let _ = tokio::fs::remove_file(&tmp_abs).await;
                return Err(UploadError::HashMismatch {
                    expected: expected.to_string(),
                    actual: sha256,
                });
            }
        }

        if tokio::fs::rename(&tmp_abs, &dest_abs).await.is_err() {
            let _ = tokio::fs::remove_file(&dest_abs).await;
            tokio::fs::rename(&tmp_abs, &dest_abs).await?;
        }

        Ok(CommitOutcome {
            path: dest_rel,
            bytes,
            sha256,
        })
    }

    /// Removes the partial file and drops the session.
    pub async fn abort(&self, id: &str) -> Result<(), UploadError> {
        let tmp_abs = {
            let mut sessions = self.sessions.lock();
            sessions
                .remove(id)
                .ok_or_else(|| UploadError::UnknownSession(id.to_string()))?
                .tmp_abs
        };
        tokio::fs::remove_file(tmp_abs).await?;
        Ok(())
    }

    fn reap_stale(&self, now_unix: i64) {
        self.sessions
            .lock()
            .retain(|_, session| now_unix - session.last_at < SESSION_TTL_SECS);
    }
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
#[path = "upload_tests.rs"]
mod tests;
