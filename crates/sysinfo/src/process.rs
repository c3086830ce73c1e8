// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-PID CPU%/RSS sampling for running MC and frpc children.
//!
//! `sysinfo` computes each process's CPU usage from successive refreshes
//! internally (delta of accumulated ticks over elapsed wall time); this
//! wrapper keeps the one `System` alive across heartbeat ticks so that
//! internal state carries forward, re-refreshes only the PIDs the caller
//! names, and clamps the result to `[0, 100]` per instance. A PID absent
//! from one tick's request list is simply absent from that tick's
//! result map — which is the eviction the caller needs, since the MC/FRP
//! supervisors only ever ask about processes they still consider alive.

use std::collections::HashMap;

use sysinfo::{Pid, System};

/// CPU and memory reading for one running process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    pub cpu_percent: f32,
    pub rss_bytes: u64,
}

pub struct ProcessSampler {
    system: System,
}

impl ProcessSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Refreshes and samples each of `pids`. PIDs that no longer exist
    /// are silently omitted from the returned map.
    pub fn sample(&mut self, pids: &[u32]) -> HashMap<u32, ProcessSample> {
        let mut out = HashMap::with_capacity(pids.len());
        for &pid in pids {
            let sys_pid = Pid::from(pid as usize);
            self.system.refresh_process(sys_pid);
            if let Some(proc) = self.system.process(sys_pid) {
                out.insert(
                    pid,
                    ProcessSample {
                        cpu_percent: proc.cpu_usage().clamp(0.0, 100.0),
                        rss_bytes: proc.memory(),
                    },
                );
            }
        }
        out
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
