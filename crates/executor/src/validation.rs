// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument validation: instance IDs, jar filenames, hex hashes.

use elegantmc_core::InstanceId;

use crate::error::ExecutorError;

pub fn instance_id(raw: &str) -> Result<InstanceId, ExecutorError> {
    InstanceId::parse(raw).map_err(ExecutorError::from)
}

/// Rejects a jar filename containing a path separator or a `..` segment;
/// it is joined onto an instance directory as a bare filename.
pub fn jar_name(raw: &str) -> Result<&str, ExecutorError> {
    if raw.is_empty() || raw.contains('/') || raw.contains('\\') || raw.contains("..") {
        return Err(ExecutorError::Validation(format!(
            "invalid jar_name: {raw:?}"
        )));
    }
    Ok(raw)
}

/// `frpc_install` requires a sha256 that is exactly 64 hex characters.
pub fn sha256_hex(raw: &str) -> Result<&str, ExecutorError> {
    if raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(raw)
    } else {
        Err(ExecutorError::Validation(format!(
            "sha256 must be 64 hex characters, got {raw:?}"
        )))
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
