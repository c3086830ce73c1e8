// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates a single `mc_restore` call: best-effort stop, wipe, extract.

use std::future::Future;

use elegantmc_fs::sandbox::Sandbox;

use crate::archive;
use crate::error::BackupError;

/// Restores `instance_id`'s directory from the archive at `zip_path`
/// (sandbox-relative). The archive's extension picks the extractor: any
/// name ending in `.tar.gz` is treated as a gzip tar, everything else as a
/// zip. `stop` runs only when the instance is currently running; its
/// result does not abort the restore.
pub async fn restore<S, F>(
    sandbox: &Sandbox,
    instance_id: &str,
    zip_path: &str,
    stop: S,
) -> Result<(), BackupError>
where
    S: FnOnce() -> F,
    F: Future<Output = ()>,
{
    let archive_path = sandbox.resolve(zip_path)?;
    if !archive_path.is_file() {
        return Err(BackupError::NotFound(zip_path.to_string()));
    }

    stop().await;

    let instance_dir = sandbox.resolve_non_root(&format!("servers/{instance_id}"))?;
    if instance_dir.is_dir() {
        std::fs::remove_dir_all(&instance_dir)?;
    }
    std::fs::create_dir_all(&instance_dir)?;

    if zip_path.ends_with(".tar.gz") {
        archive::untar_gz(&archive_path, &instance_dir)?;
    } else {
        archive::unzip(&archive_path, &instance_dir)?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "restore_tests.rs"]
mod tests;
