// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McError {
    #[error("instance {0} is already running")]
    AlreadyRunning(String),
    #[error("instance {0} is not known to this supervisor")]
    Unknown(String),
    #[error("jar not found: {0}")]
    JarNotFound(String),
    #[error("could not determine required Java major for {jar}: {reason}")]
    JarInspection { jar: String, reason: String },
    #[error("no configured Java candidate satisfies the required major {required} (available majors: {available:?})")]
    NoJavaCandidate {
        required: u32,
        available: Vec<u32>,
    },
    #[error("failed to spawn java process: {0}")]
    Spawn(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
