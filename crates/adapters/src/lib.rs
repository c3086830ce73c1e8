// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Low-level adapters shared by the MC and FRP supervisors: subprocess
//! spawning with timeouts, and line-oriented forwarding of a child
//! process's stdout/stderr.

pub mod child_io;
pub mod subprocess;

pub use child_io::{spawn_line_forwarder, ChildLine, ChildStream};
pub use subprocess::run_with_timeout;
