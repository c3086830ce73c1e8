// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sandboxed filesystem surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("path must not be absolute: {0}")]
    AbsolutePath(String),
    #[error("path contains a NUL byte")]
    NulByte,
    #[error("path escapes the sandbox root: {0}")]
    Escapes(String),
    #[error("refused to operate on the sandbox root itself")]
    IsRoot,
    #[error("destination already exists: {0}")]
    DestinationExists(String),
    #[error("archive entry contains a symlink: {0}")]
    SymlinkInArchive(String),
    #[error("archive entry escapes the destination: {0}")]
    ArchiveEscapes(String),
    #[error("too many entries scanned (limit {0})")]
    TooManyEntries(usize),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("hash mismatch: expected {algo} {expected}, got {actual}")]
    HashMismatch {
        algo: &'static str,
        expected: String,
        actual: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unknown upload session: {0}")]
    UnknownSession(String),
    #[error("too many concurrent upload sessions (limit {0})")]
    TooManySessions(usize),
    #[error("chunk of {got} bytes exceeds the per-chunk cap of {cap} bytes")]
    ChunkTooLarge { got: usize, cap: usize },
    #[error("upload of {got} bytes exceeds the per-file cap of {cap} bytes")]
    FileTooLarge { got: u64, cap: u64 },
    #[error("invalid base64 chunk: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("sha256 mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}
