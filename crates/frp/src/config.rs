// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialises a per-proxy `frpc` TOML config using the modern
//! `serverAddr`/`serverPort`/`[[proxies]]` schema rather than the legacy
//! `[common]` INI format.

use serde::Serialize;

use crate::error::FrpError;

/// Parameters for a single tunnel, mirroring the command executor's
/// `frp_start` payload.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub name: String,
    pub server_addr: String,
    pub server_port: u16,
    pub token: Option<String>,
    pub local_ip: Option<String>,
    pub local_port: u16,
    /// 0 means the server side picks a remote port.
    pub remote_port: u16,
}

#[derive(Debug, Clone, Serialize)]
struct FrpcConfig {
    #[serde(rename = "serverAddr")]
    server_addr: String,
    #[serde(rename = "serverPort")]
    server_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth: Option<AuthConfig>,
    proxies: Vec<ProxyBlock>,
}

#[derive(Debug, Clone, Serialize)]
struct AuthConfig {
    method: &'static str,
    token: String,
}

#[derive(Debug, Clone, Serialize)]
struct ProxyBlock {
    name: String,
    #[serde(rename = "type")]
    proxy_type: &'static str,
    #[serde(rename = "localIP")]
    local_ip: String,
    #[serde(rename = "localPort")]
    local_port: u16,
    #[serde(rename = "remotePort", skip_serializing_if = "Option::is_none")]
    remote_port: Option<u16>,
}

/// Renders `cfg` into the TOML text `frpc -c <path>` expects.
pub fn render(cfg: &ProxyConfig) -> Result<String, FrpError> {
    let doc = FrpcConfig {
        server_addr: cfg.server_addr.clone(),
        server_port: cfg.server_port,
        auth: cfg.token.clone().map(|token| AuthConfig {
            method: "token",
            token,
        }),
        proxies: vec![ProxyBlock {
            name: cfg.name.clone(),
            proxy_type: "tcp",
            local_ip: cfg.local_ip.clone().unwrap_or_else(|| "127.0.0.1".to_string()),
            local_port: cfg.local_port,
            remote_port: if cfg.remote_port == 0 {
                None
            } else {
                Some(cfg.remote_port)
            },
        }],
    };

    Ok(toml::to_string(&doc)?)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
