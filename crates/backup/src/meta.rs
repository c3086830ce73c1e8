// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `.meta.json` sidecar written beside every backup archive.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BackupError;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Zip => "zip",
            Format::TarGz => "tar.gz",
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Zip
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub schema_version: u32,
    pub instance: String,
    pub filename: String,
    pub format: Format,
    pub created_at_unix: i64,
    pub file_count: u64,
    pub byte_count: u64,
    pub comment: Option<String>,
}

impl BackupMeta {
    pub fn new(
        instance: impl Into<String>,
        filename: impl Into<String>,
        format: Format,
        created_at_unix: i64,
        file_count: u64,
        byte_count: u64,
        comment: Option<String>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            instance: instance.into(),
            filename: filename.into(),
            format,
            created_at_unix,
            file_count,
            byte_count,
            comment,
        }
    }

    pub fn write(&self, meta_path: &Path) -> Result<(), BackupError> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(meta_path, json)?;
        Ok(())
    }

    pub fn read(meta_path: &Path) -> Result<Self, BackupError> {
        let bytes = std::fs::read(meta_path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
