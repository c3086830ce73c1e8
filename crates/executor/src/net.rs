// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `net_check_port`: a bounded TCP connect probe, used to verify a tunnel
//! or a freshly started MC server is actually reachable.

use elegantmc_adapters::subprocess::NET_CHECK_TIMEOUT;
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PortCheck {
    pub open: bool,
}

/// Attempts a TCP connect to `host:port`, bounded by `NET_CHECK_TIMEOUT`.
pub async fn check_port(host: &str, port: u16) -> PortCheck {
    let target = format!("{host}:{port}");
    let open = tokio::time::timeout(NET_CHECK_TIMEOUT, TcpStream::connect(&target))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false);
    PortCheck { open }
}

#[cfg(test)]
#[path = "net_tests.rs"]
mod tests;
