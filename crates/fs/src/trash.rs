// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `trash`/`trash_restore`/`trash_list`/`trash_delete`. Trashed paths move
//! to `_trash/<timestamp>-<rand>/<basename>` inside the sandbox root, with
//! a JSON sidecar recording where they came from.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SandboxError;
use crate::sandbox::Sandbox;

const TRASH_DIR: &str = "_trash";
const SIDECAR_NAME: &str = "elegantmc-trash.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashEntry {
    pub trash_id: String,
    pub original_path: String,
    pub payload_rel: String,
    pub deleted_at_unix: i64,
    pub is_dir: bool,
}

pub async fn trash(sandbox: &Sandbox, rel: &str, now_unix: i64) -> Result<TrashEntry, SandboxError> {
    let source = sandbox.resolve_non_root(rel)?;
    let meta = tokio::fs::symlink_metadata(&source).await?;
    let basename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let rand_suffix: u64 = rand::rng().random();
    let trash_id = format!("{now_unix}-{rand_suffix:016x}");
    let bucket_rel = format!("{TRASH_DIR}/{trash_id}");
    let payload_rel = format!("{bucket_rel}/{basename}");

    let bucket_abs = sandbox.resolve(&bucket_rel)?;
    tokio::fs::create_dir_all(&bucket_abs).await?;
    let payload_abs = sandbox.resolve(&payload_rel)?;
    tokio::fs::rename(&source, &payload_abs).await?;

    let entry = TrashEntry {
        trash_id: trash_id.clone(),
        original_path: rel.to_string(),
        payload_rel,
        deleted_at_unix: now_unix,
        is_dir: meta.is_dir(),
    };
    let sidecar_abs = sandbox.resolve(&format!("{bucket_rel}/{SIDECAR_NAME}"))?;
    tokio::fs::write(sidecar_abs, serde_json::to_vec_pretty(&entry)?).await?;
    Ok(entry)
}

pub async fn list(sandbox: &Sandbox) -> Result<Vec<TrashEntry>, SandboxError> {
    let trash_root = sandbox.resolve(TRASH_DIR)?;
    if !tokio::fs::try_exists(&trash_root).await? {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&trash_root).await?;
    while let Some(dir_entry) = read_dir.next_entry().await? {
        let sidecar = dir_entry.path().join(SIDECAR_NAME);
        if let Ok(bytes) = tokio::fs::read(&sidecar).await {
            if let Ok(entry) = serde_json::from_slice::<TrashEntry>(&bytes) {
                entries.push(entry);
            }
        }
    }
    entries.sort_by(|a, b| a.deleted_at_unix.cmp(&b.deleted_at_unix));
    Ok(entries)
}

async fn find_entry(sandbox: &Sandbox, trash_id: &str) -> Result<TrashEntry, SandboxError> {
    list(sandbox)
        .await?
        .into_iter()
        .find(|e| e.trash_id == trash_id)
        .ok_or_else(|| SandboxError::NotFound(trash_id.to_string()))
}

/// Restores the trashed path to its original location. Refuses if that
/// location is now occupied.
pub async fn restore(sandbox: &Sandbox, trash_id: &str) -> Result<(), SandboxError> {
    let entry = find_entry(sandbox, trash_id).await?;
    let dest = sandbox.resolve(&entry.original_path)?;
    if tokio::fs::try_exists(&dest).await? {
        return Err(SandboxError::DestinationExists(entry.original_path));
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let payload_abs = sandbox.resolve(&entry.payload_rel)?;
    tokio::fs::rename(&payload_abs, &dest).await?;

    let bucket_abs = sandbox.resolve(&format!("{TRASH_DIR}/{trash_id}"))?;
    let _ = tokio::fs::remove_dir_all(bucket_abs).await;
    Ok(())
}

/// Permanently deletes a trashed entry without restoring it.
pub async fn delete(sandbox: &Sandbox, trash_id: &str) -> Result<(), SandboxError> {
    let _ = find_entry(sandbox, trash_id).await?;
    let bucket_abs = sandbox.resolve(&format!("{TRASH_DIR}/{trash_id}"))?;
    tokio::fs::remove_dir_all(bucket_abs).await?;
    Ok(())
}

#[cfg(test)]
#[path = "trash_tests.rs"]
mod tests;
