// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `diagnostics_bundle`: a point-in-time snapshot of host telemetry plus
//! every supervisor's state, bounded by a fixed timeout at the call site.

use std::path::Path;

use elegantmc_core::{FrpProxyState, InstanceId, McInstanceState};
use elegantmc_sysinfo::HostInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsBundle {
    pub ts_unix: i64,
    pub host: HostInfo,
    pub mc_instances: Vec<McEntry>,
    pub frp_proxies: Vec<FrpProxyState>,
    pub schedule_task_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McEntry {
    pub instance_id: String,
    #[serde(flatten)]
    pub state: McInstanceState,
}

pub fn build(
    ts_unix: i64,
    sandbox_root: &Path,
    mc_instances: Vec<(InstanceId, McInstanceState)>,
    frp_proxies: Vec<(InstanceId, FrpProxyState)>,
    schedule_task_count: usize,
) -> DiagnosticsBundle {
    let system = {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        sys
    };
    let host = elegantmc_sysinfo::collect_host(&system, sandbox_root);

    DiagnosticsBundle {
        ts_unix,
        host,
        mc_instances: mc_instances
            .into_iter()
            .map(|(id, state)| McEntry {
                instance_id: id.as_str().to_string(),
                state,
            })
            .collect(),
        frp_proxies: frp_proxies.into_iter().map(|(_, state)| state).collect(),
        schedule_task_count,
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
