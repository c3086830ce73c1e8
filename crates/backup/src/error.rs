// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup {0} not found")]
    NotFound(String),
    #[error("keep_last must be between 1 and 1000")]
    KeepLastOutOfRange,
    #[error("sandbox error: {0}")]
    Sandbox(#[from] elegantmc_fs::SandboxError),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("meta sidecar error: {0}")]
    Meta(#[from] serde_json::Error),
}
