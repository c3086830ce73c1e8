// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory state tracked per tunnel by the FRP supervisor. Proxies are
//! independent; stopping one never affects another.

use serde::Serialize;

/// Snapshot of a managed `frpc` process. The proxy name is also the
/// instance ID it tunnels for, and the key in the supervisor's table.
///
/// As with [`crate::mc_state::McInstanceState`], the process handle lives
/// beside this struct in the supervisor's table rather than inside it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrpProxyState {
    pub proxy_name: String,
    pub server_addr: String,
    pub remote_addr: String,
    pub remote_port: u16,
    pub started_unix: i64,
    pub workdir: String,
}

impl FrpProxyState {
    pub fn new(
        proxy_name: impl Into<String>,
        server_addr: impl Into<String>,
        remote_addr: impl Into<String>,
        remote_port: u16,
        started_unix: i64,
        workdir: impl Into<String>,
    ) -> Self {
        Self {
            proxy_name: proxy_name.into(),
            server_addr: server_addr.into(),
            remote_addr: remote_addr.into(),
            remote_port,
            started_unix,
            workdir: workdir.into(),
        }
    }
}

#[cfg(test)]
#[path = "frp_state_tests.rs"]
mod tests;
