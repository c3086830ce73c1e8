// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! elegantmc-frp: the `frpc` tunnel supervisor. Materialises a per-proxy
//! config file, spawns the pre-installed `frpc` binary, and streams its
//! output back to the executor.

pub mod config;
pub mod error;
pub mod supervisor;

pub use config::ProxyConfig;
pub use error::FrpError;
pub use supervisor::{LogSink, Supervisor};
