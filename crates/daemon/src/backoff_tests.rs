// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[test]
fn first_delay_is_at_least_the_minimum() {
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
    let delay = backoff.next();
    assert!(delay >= Duration::from_secs(1));
    assert!(delay <= Duration::from_secs(1) + Duration::from_secs(1) / 3);
}

#[test]
fn delay_doubles_each_call_until_capped_at_max() {
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
    let mut lower_bounds = Vec::new();
    for _ in 0..10 {
        let delay = backoff.next();
        lower_bounds.push(delay);
    }
    // Eventually the base delay saturates at `max`, so the last few calls
    // should all land in [30s, 40s).
    let last = lower_bounds.last().copied().unwrap();
    assert!(last >= Duration::from_secs(30));
    assert!(last < Duration::from_secs(40));
}

#[test]
fn reset_returns_to_the_minimum_delay() {
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
    for _ in 0..5 {
        backoff.next();
    }
    backoff.reset();
    let delay = backoff.next();
    assert!(delay >= Duration::from_secs(1));
    assert!(delay <= Duration::from_secs(1) + Duration::from_secs(1) / 3);
}
