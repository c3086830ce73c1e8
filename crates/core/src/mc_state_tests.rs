// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn not_running_has_no_pid_or_exit() {
    let state = McInstanceState::not_running("/usr/bin/java", 21, 17);
    assert!(!state.running);
    assert_eq!(state.pid, None);
    assert_eq!(state.last_exit, LastExit::none());
}

#[test]
fn mark_started_sets_running_and_pid() {
    let mut state = McInstanceState::not_running("/usr/bin/java", 21, 17);
    state.mark_started(4242);
    assert!(state.running);
    assert_eq!(state.pid, Some(4242));
}

#[test]
fn mark_exited_clears_running_and_pid_and_records_exit() {
    let mut state = McInstanceState::not_running("/usr/bin/java", 21, 17);
    state.mark_started(4242);
    state.mark_exited(LastExit {
        code: Some(0),
        signal: None,
        at_unix: Some(1_700_000_000),
    });
    assert!(!state.running);
    assert_eq!(state.pid, None);
    assert_eq!(state.last_exit.code, Some(0));
    assert_eq!(state.last_exit.at_unix, Some(1_700_000_000));
}
