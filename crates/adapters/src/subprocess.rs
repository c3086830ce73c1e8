// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Timeout for a `java -version` probe during Java candidate selection.
pub const JAVA_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for `net_check_port`'s connect attempt.
pub const NET_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a single `frpc_install` download-and-verify step.
pub const FRPC_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for assembling a `diagnostics_bundle`.
pub const DIAGNOSTICS_BUNDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
