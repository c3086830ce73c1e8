// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn base_config() -> ProxyConfig {
    ProxyConfig {
        name: "s1".to_string(),
        server_addr: "frp.example.com".to_string(),
        server_port: 7000,
        token: None,
        local_ip: None,
        local_port: 25565,
        remote_port: 25566,
    }
}

#[test]
fn renders_server_and_proxy_block() {
    let text = render(&base_config()).unwrap();
    assert!(text.contains("serverAddr = \"frp.example.com\""));
    assert!(text.contains("serverPort = 7000"));
    assert!(text.contains("name = \"s1\""));
    assert!(text.contains("localPort = 25565"));
    assert!(text.contains("remotePort = 25566"));
}

#[test]
fn defaults_local_ip_to_loopback() {
    let text = render(&base_config()).unwrap();
    assert!(text.contains("localIP = \"127.0.0.1\""));
}

#[test]
fn omits_remote_port_when_zero() {
    let mut cfg = base_config();
    cfg.remote_port = 0;
    let text = render(&cfg).unwrap();
    assert!(!text.contains("remotePort"));
}

#[test]
fn includes_auth_block_when_token_present() {
    let mut cfg = base_config();
    cfg.token = Some("secret".to_string());
    let text = render(&cfg).unwrap();
    assert!(text.contains("[auth]"));
    assert!(text.contains("method = \"token\""));
    assert!(text.contains("token = \"secret\""));
}

#[test]
fn omits_auth_block_when_no_token() {
    let text = render(&base_config()).unwrap();
    assert!(!text.contains("[auth]"));
}

#[test]
fn round_trips_through_toml_parser() {
    let text = render(&base_config()).unwrap();
    let value: toml::Value = text.parse().unwrap();
    assert_eq!(
        value["serverAddr"].as_str(),
        Some("frp.example.com")
    );
    assert_eq!(
        value["proxies"][0]["name"].as_str(),
        Some("s1")
    );
}
