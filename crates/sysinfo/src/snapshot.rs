// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles one heartbeat's worth of telemetry: host counters, ranked
//! local addresses, and per-instance process readings layered onto the
//! MC/FRP supervisors' own state snapshots.

use std::path::Path;

use elegantmc_core::{FrpProxyState, McInstanceState};
use serde::Serialize;
use sysinfo::System;

use crate::host::{self, HostInfo};
use crate::process::ProcessSampler;

/// One MC instance's state plus live process readings, when running.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McInstanceSnapshot {
    pub instance_id: String,
    #[serde(flatten)]
    pub state: McInstanceState,
    pub cpu_percent: Option<f32>,
    pub rss_bytes: Option<u64>,
}

/// The full heartbeat payload, ready to embed in a wire envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatSnapshot {
    pub ts_unix: i64,
    #[serde(flatten)]
    pub host: HostInfo,
    pub local_ipv4_addrs: Vec<String>,
    pub preferred_connect_addrs: Vec<String>,
    pub frp_proxies: Vec<FrpProxyState>,
    pub mc_instances: Vec<McInstanceSnapshot>,
}

/// Builds a heartbeat snapshot. `system` should already have had
/// `refresh_memory`/`refresh_cpu_usage` called on it this tick; `sampler`
/// is reused across ticks so its per-process deltas stay meaningful.
pub fn build(
    ts_unix: i64,
    system: &System,
    sampler: &mut ProcessSampler,
    sandbox_root: &Path,
    preferred_connect_addrs: &[String],
    frp_proxies: Vec<FrpProxyState>,
    mc_instances: Vec<(String, McInstanceState)>,
) -> HeartbeatSnapshot {
    let host = host::collect(system, sandbox_root);
    let local_ipv4_addrs = crate::addrs::local_ipv4_addrs()
        .into_iter()
        .map(|a| a.to_string())
        .collect();

    let running_pids: Vec<u32> = mc_instances
        .iter()
        .filter_map(|(_, state)| if state.running { state.pid } else { None })
        .collect();
    let samples = sampler.sample(&running_pids);

    let mc_instances = mc_instances
        .into_iter()
        .map(|(instance_id, state)| {
            let sample = state.pid.and_then(|pid| samples.get(&pid));
            McInstanceSnapshot {
                instance_id,
                cpu_percent: sample.map(|s| s.cpu_percent),
                rss_bytes: sample.map(|s| s.rss_bytes),
                state,
            }
        })
        .collect();

    HeartbeatSnapshot {
        ts_unix,
        host,
        local_ipv4_addrs,
        preferred_connect_addrs: preferred_connect_addrs.to_vec(),
        frp_proxies,
        mc_instances,
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
