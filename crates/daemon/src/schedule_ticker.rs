// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal in-process ticker for `schedule.json`: scans due tasks once a
//! second and invokes the same `schedule_run_task` handler a
//! Panel-triggered call would use.

use std::sync::Arc;
use std::time::Duration;

use elegantmc_core::{Clock, SystemClock};
use elegantmc_executor::{Dispatcher, ScheduleTask};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) {
    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                run_due_tasks(&dispatcher).await;
            }
            _ = shutdown.cancelled() => break,
        }
    }
}

async fn run_due_tasks(dispatcher: &Arc<Dispatcher>) {
    let now = SystemClock.now_unix();
    let result = dispatcher.dispatch("schedule_get", json!({})).await;
    let Some(output) = result.output else {
        return;
    };
    let tasks: Vec<ScheduleTask> = match serde_json::from_value(output) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "failed to parse schedule.json for ticker scan");
            return;
        }
    };

    for task in tasks {
        if !is_due(&task, now) {
            continue;
        }
        let result = dispatcher
            .dispatch("schedule_run_task", json!({ "id": task.id }))
            .await;
        if !result.ok {
            warn!(task_id = %task.id, error = ?result.error, "scheduled task failed");
        }
    }
}

/// A task is due if its `every_sec` interval has elapsed since
/// `last_run_unix` (or it has never run), or its `at_unix` deadline has
/// passed and it has never run.
fn is_due(task: &ScheduleTask, now: i64) -> bool {
    if let Some(every_sec) = task.every_sec {
        let last_run = task.last_run_unix.unwrap_or(0);
        return now - last_run >= every_sec as i64;
    }
    if let Some(at_unix) = task.at_unix {
        return task.last_run_unix.is_none() && now >= at_unix;
    }
    false
}

#[cfg(test)]
#[path = "schedule_ticker_tests.rs"]
mod tests;
