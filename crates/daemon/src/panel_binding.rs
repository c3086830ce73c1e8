// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted record of which Panel this Daemon has bound to: a single
//! small JSON file written once and checked on every subsequent connect.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelBinding {
    pub panel_id: String,
}

/// Reads the persisted binding. A missing file means this Daemon has
/// never bound to a Panel; any other error is surfaced so the caller can
/// decide whether to treat it as fatal.
pub async fn load(path: &Path) -> std::io::Result<Option<PanelBinding>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let binding = serde_json::from_slice(&bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            Ok(Some(binding))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn save(path: &Path, panel_id: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(&PanelBinding {
        panel_id: panel_id.to_string(),
    })
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::write(path, bytes).await
}

#[cfg(test)]
#[path = "panel_binding_tests.rs"]
mod tests;
