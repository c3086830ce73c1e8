// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates a single `mc_backup` call: optional stop, archive, sidecar,
//! optional prune.

use std::future::Future;
use std::sync::Arc;

use elegantmc_core::Clock;
use elegantmc_fs::sandbox::Sandbox;

use crate::archive::{self, ArchiveProgress};
use crate::error::BackupError;
use crate::meta::{BackupMeta, Format};
use crate::prune;

/// Input to [`create_backup`]. Mirrors `mc_backup`'s command arguments.
#[derive(Debug, Clone)]
pub struct BackupRequest {
    pub instance_id: String,
    pub format: Format,
    pub backup_name: Option<String>,
    pub comment: Option<String>,
    pub stop: bool,
    pub keep_last: Option<usize>,
}

impl BackupRequest {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            format: Format::Zip,
            backup_name: None,
            comment: None,
            stop: false,
            keep_last: None,
        }
    }
}

/// Result of a successful backup: the meta sidecar plus where the archive
/// landed, both relative to the sandbox root.
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    pub meta: BackupMeta,
    pub archive_rel: String,
    pub pruned: Vec<String>,
}

/// Runs a backup. `stop` is invoked only when `req.stop` is true and is
/// expected to be best-effort: its error, if any, does not abort the
/// backup. `on_progress` is forwarded straight from the archiving step.
pub async fn create_backup<S, F>(
    sandbox: &Sandbox,
    clock: &Arc<dyn Clock>,
    req: &BackupRequest,
    stop: S,
    mut on_progress: impl FnMut(ArchiveProgress),
) -> Result<BackupOutcome, BackupError>
where
    S: FnOnce() -> F,
    F: Future<Output = ()>,
{
    if req.stop {
        stop().await;
    }

    let instance_dir = sandbox.resolve(&format!("servers/{}", req.instance_id))?;
    let backups_dir = sandbox.resolve(&format!("_backups/{}", req.instance_id))?;
    std::fs::create_dir_all(&backups_dir)?;

    let now = clock.now_unix();
    let filename = req
        .backup_name
        .clone()
        .unwrap_or_else(|| format!("{}-{now}.{}", req.instance_id, req.format.extension()));
    let archive_path = backups_dir.join(&filename);

    let (file_count, byte_count) = match req.format {
        Format::Zip => archive::zip_dir(&instance_dir, &archive_path, &mut on_progress)?,
        Format::TarGz => archive::tar_gz_dir(&instance_dir, &archive_path, &mut on_progress)?,
    };

    let meta = BackupMeta::new(
        req.instance_id.clone(),
        filename.clone(),
        req.format,
        now,
        file_count,
        byte_count,
        req.comment.clone(),
    );
    meta.write(&backups_dir.join(format!("{filename}.meta.json")))?;

    let pruned = match req.keep_last {
        Some(keep_last) => prune::prune_keep_last(&backups_dir, keep_last)?,
        None => Vec::new(),
    };

    Ok(BackupOutcome {
        meta,
        archive_rel: format!("_backups/{}/{filename}", req.instance_id),
        pruned,
    })
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
