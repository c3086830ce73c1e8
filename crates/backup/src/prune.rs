// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `keep_last` pruning: deletes the oldest archives for an instance beyond
//! a retention count, each with its `.meta.json` sidecar.

use std::path::{Path, PathBuf};

use crate::error::BackupError;
use crate::meta::BackupMeta;

/// Caps accepted by `mc_backup`'s `keep_last` parameter.
pub const MIN_KEEP_LAST: usize = 1;
pub const MAX_KEEP_LAST: usize = 1000;

pub fn validate_keep_last(keep_last: usize) -> Result<(), BackupError> {
    if !(MIN_KEEP_LAST..=MAX_KEEP_LAST).contains(&keep_last) {
        return Err(BackupError::KeepLastOutOfRange);
    }
    Ok(())
}

/// Lists every `<name>.meta.json` sidecar under `backups_dir`, newest
/// first, and removes the archive + sidecar pair for every entry beyond
/// `keep_last`. Returns the filenames removed.
pub fn prune_keep_last(backups_dir: &Path, keep_last: usize) -> Result<Vec<String>, BackupError> {
    validate_keep_last(keep_last)?;

    let mut entries: Vec<(i64, PathBuf, BackupMeta)> = Vec::new();
    let read_dir = match std::fs::read_dir(backups_dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".meta.json") {
            continue;
        }
        let meta = BackupMeta::read(&path)?;
        entries.push((meta.created_at_unix, path, meta));
    }

    entries.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = Vec::new();
    for (_, meta_path, meta) in entries.into_iter().skip(keep_last) {
        let archive_path = backups_dir.join(&meta.filename);
        if archive_path.is_file() {
            std::fs::remove_file(&archive_path)?;
        }
        std::fs::remove_file(&meta_path)?;
        removed.push(meta.filename);
    }

    Ok(removed)
}

#[cfg(test)]
#[path = "prune_tests.rs"]
mod tests;
