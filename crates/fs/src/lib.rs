// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The sandboxed filesystem surface: path resolution, basic file
//! operations, trash, zip/unzip, downloads, chunked uploads, and a
//! cached disk-usage walker.

pub mod archive;
pub mod download;
pub mod du;
pub mod error;
pub mod sandbox;
pub mod trash;
pub mod upload;

pub use archive::{unzip, zip_dir};
pub use download::{download, ExpectedHashes, Progress};
pub use du::{DuCache, DuResult};
pub use error::{DownloadError, SandboxError, UploadError};
pub use sandbox::{DirEntry, Sandbox, Stat};
pub use trash::TrashEntry;
pub use upload::{CommitOutcome, UploadManager};
