// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use elegantmc_core::McInstanceState;
use std::path::PathBuf;

#[test]
fn build_reports_the_requested_instance_and_task_count() {
    let state = McInstanceState::not_running("java", 17, 17);
    let bundle = build(
        1_000,
        &PathBuf::from("/"),
        vec![(InstanceId::parse("s1").unwrap(), state)],
        Vec::new(),
        3,
    );

    assert_eq!(bundle.ts_unix, 1_000);
    assert_eq!(bundle.mc_instances.len(), 1);
    assert_eq!(bundle.mc_instances[0].instance_id, "s1");
    assert_eq!(bundle.schedule_task_count, 3);
}
