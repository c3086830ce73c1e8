// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Validation(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("bad arguments: {0}")]
    BadArgs(#[from] serde_json::Error),
    #[error(transparent)]
    Sandbox(#[from] elegantmc_fs::SandboxError),
    #[error(transparent)]
    Upload(#[from] elegantmc_fs::error::UploadError),
    #[error(transparent)]
    Download(#[from] elegantmc_fs::error::DownloadError),
    #[error(transparent)]
    Mc(#[from] elegantmc_mc::McError),
    #[error(transparent)]
    Frp(#[from] elegantmc_frp::FrpError),
    #[error(transparent)]
    Backup(#[from] elegantmc_backup::BackupError),
    #[error(transparent)]
    InstanceId(#[from] elegantmc_core::InstanceIdError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
