// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory state tracked per Minecraft instance by the MC supervisor.
//! Created on first `mc_start`, mutated by the supervisor on spawn and by
//! a single reaper task on process exit, destroyed when the instance
//! directory is deleted.

use serde::Serialize;

/// How the last run of this instance's process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    pub at_unix: Option<i64>,
}

impl LastExit {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Snapshot of a managed Minecraft server process.
///
/// The `process-handle` and `stdin-writer` named in the data model live
/// beside this struct in the supervisor's table rather than inside it,
/// since they are not `Clone`/`Serialize` and heartbeats only need the
/// fields below.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McInstanceState {
    pub running: bool,
    pub pid: Option<u32>,
    pub java: String,
    pub java_major: u32,
    pub required_java_major: u32,
    pub last_exit: LastExit,
}

impl McInstanceState {
    pub fn not_running(java: impl Into<String>, java_major: u32, required_java_major: u32) -> Self {
        Self {
            running: false,
            pid: None,
            java: java.into(),
            java_major,
            required_java_major,
            last_exit: LastExit::none(),
        }
    }

    pub fn mark_started(&mut self, pid: u32) {
        self.running = true;
        self.pid = Some(pid);
    }

    pub fn mark_exited(&mut self, exit: LastExit) {
        self.running = false;
        self.pid = None;
        self.last_exit = exit;
    }
}

#[cfg(test)]
#[path = "mc_state_tests.rs"]
mod tests;
