// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate CPU/memory/disk for the host, plus disk usage for whichever
//! filesystem contains the sandbox root.

use std::path::Path;

use serde::Serialize;
use sysinfo::{Disks, System};

/// Snapshot of host-wide resource counters, all sizes in bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub hostname: String,
    pub cpu_percent: f32,
    pub mem_total: u64,
    pub mem_used: u64,
    pub mem_free: u64,
    pub disk_total: u64,
    pub disk_used: u64,
    pub disk_free: u64,
}

/// Reads CPU/memory from `system` (expected to have already been
/// refreshed by the caller) and disk usage for the filesystem that
/// contains `sandbox_root`.
pub fn collect(system: &System, sandbox_root: &Path) -> HostInfo {
    let hostname = System::host_name().unwrap_or_else(|| "unknown".to_string());
    let mem_total = system.total_memory();
    let mem_used = system.used_memory();
    let mem_free = mem_total.saturating_sub(mem_used);

    let disks = Disks::new_with_refreshed_list();
    let disk = best_matching_disk(&disks, sandbox_root);
    let (disk_total, disk_used, disk_free) = match disk {
        Some(d) => {
            let total = d.total_space();
            let free = d.available_space();
            (total, total.saturating_sub(free), free)
        }
        None => (0, 0, 0),
    };

    HostInfo {
        hostname,
        cpu_percent: system.global_cpu_usage().clamp(0.0, 100.0),
        mem_total,
        mem_used,
        mem_free,
        disk_total,
        disk_used,
        disk_free,
    }
}

/// The disk whose mount point is the longest prefix of `sandbox_root`.
fn best_matching_disk<'a>(disks: &'a Disks, sandbox_root: &Path) -> Option<&'a sysinfo::Disk> {
    disks
        .list()
        .iter()
        .filter(|d| sandbox_root.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
