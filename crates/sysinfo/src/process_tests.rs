// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn sample_reports_the_current_process_and_omits_unknown_pids() {
    let mut sampler = ProcessSampler::new();
    let own_pid = std::process::id();

    let samples = sampler.sample(&[own_pid, u32::MAX]);

    assert!(samples.contains_key(&own_pid));
    assert!(!samples.contains_key(&u32::MAX));
    let own = samples[&own_pid];
    assert!(own.cpu_percent >= 0.0 && own.cpu_percent <= 100.0);
}

#[test]
fn sample_omits_pids_not_in_the_requested_set() {
    let mut sampler = ProcessSampler::new();
    let own_pid = std::process::id();

    let first = sampler.sample(&[own_pid]);
    assert!(first.contains_key(&own_pid));

    let second = sampler.sample(&[]);
    assert!(second.is_empty());
}
