// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fs_du`: a capped recursive size scan with a short-TTL cache, keyed by
//! the cleaned relative path.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::SandboxError;
use crate::sandbox::Sandbox;

const DEFAULT_ENTRY_CAP: usize = 250_000;
const MAX_ENTRY_CAP: usize = 2_000_000;
const DEFAULT_TTL: Duration = Duration::from_secs(60);
const MAX_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct DuResult {
    pub bytes: u64,
    pub entries_scanned: usize,
    pub cached: bool,
}

struct CacheEntry {
    bytes: u64,
    entries_scanned: usize,
    at: Instant,
}

#[derive(Default)]
pub struct DuCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl DuCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `entry_cap` is clamped to `[1, 2_000_000]` (default 250k if `None`);
    /// `ttl` is clamped to `[0, 3600s]` (default 60s if `None`).
    pub async fn du(
        &self,
        sandbox: &Sandbox,
        rel: &str,
        entry_cap: Option<usize>,
        ttl: Option<Duration>,
        force: bool,
    ) -> Result<DuResult, SandboxError> {
        let entry_cap = entry_cap.unwrap_or(DEFAULT_ENTRY_CAP).clamp(1, MAX_ENTRY_CAP);
        let ttl = ttl.unwrap_or(DEFAULT_TTL).min(MAX_TTL);

        if !force {
            if let Some(hit) = self.lookup(rel, ttl) {
                return Ok(hit);
            }
        }

        let root = sandbox.resolve(rel)?;
        let (bytes, entries_scanned) = walk(&root, entry_cap)?;

        self.entries.lock().insert(
            rel.to_string(),
            CacheEntry {
                bytes,
                entries_scanned,
                at: Instant::now(),
            },
        );

        Ok(DuResult {
            bytes,
            entries_scanned,
            cached: false,
        })
    }

    fn lookup(&self, rel: &str, ttl: Duration) -> Option<DuResult> {
        let entries = self.entries.lock();
        let entry = entries.get(rel)?;
        if entry.at.elapsed() > ttl {
            return None;
        }
        Some(DuResult {
            bytes: entry.bytes,
            entries_scanned: entry.entries_scanned,
            cached: true,
        })
    }
}

fn walk(root: &std::path::Path, entry_cap: usize) -> Result<(u64, usize), SandboxError> {
    let mut bytes = 0u64;
    let mut scanned = 0usize;
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        scanned += 1;
        if scanned > entry_cap {
            return Err(SandboxError::TooManyEntries(entry_cap));
        }
        let file_type = entry.file_type();
        if file_type.is_symlink() || file_type.is_dir() {
            continue;
        }
        bytes += entry.metadata().map_err(std::io::Error::from)?.len();
    }
    Ok((bytes, scanned))
}

#[cfg(test)]
#[path = "du_tests.rs"]
mod tests;
