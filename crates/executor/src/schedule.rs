// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `schedule_{get,set,run_task}`: a small persisted task list consumed by
//! an external ticker (or `schedule_run_task` called directly by the
//! Panel). The tick loop itself is an external collaborator; this module
//! only owns the schema, its persistence, and running one task by ID.

use elegantmc_fs::sandbox::Sandbox;
use serde::{Deserialize, Serialize};

use crate::error::ExecutorError;

const SCHEDULE_FILE: &str = "schedule.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Restart,
    Stop,
    Backup,
    Announce,
    PruneLogs,
}

/// One scheduled task. `instance_id` names the target for every variant
/// except `Announce`, which also uses `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTask {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_unix: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_last: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_unix: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Reads `schedule.json`; a missing file is an empty task list, not an
/// error (the ticker has simply never run `schedule_set` yet).
pub async fn load(sandbox: &Sandbox) -> Result<Vec<ScheduleTask>, ExecutorError> {
    match sandbox.read(SCHEDULE_FILE).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(elegantmc_fs::SandboxError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn save(sandbox: &Sandbox, tasks: &[ScheduleTask]) -> Result<(), ExecutorError> {
    let bytes = serde_json::to_vec_pretty(tasks)?;
    sandbox.write(SCHEDULE_FILE, &bytes).await?;
    Ok(())
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
