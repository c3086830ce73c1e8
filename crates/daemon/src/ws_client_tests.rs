// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn test_config() -> Config {
    Config {
        panel_url: "wss://panel.example/ws".to_string(),
        daemon_id: "host-1".to_string(),
        token: "secret-token".to_string(),
        state_dir: std::path::PathBuf::from("/tmp/elegantmc-ws-test"),
        heartbeat: Duration::from_secs(10),
        reconnect_min: Duration::from_secs(1),
        reconnect_max: Duration::from_secs(30),
        java_candidates: vec!["java".to_string()],
        preferred_addrs: vec![],
        mojang_base_url: None,
        paper_base_url: None,
        frpc_path: "frpc".to_string(),
        health_file: None,
        panel_binding: false,
    }
}

#[test]
fn build_request_sets_bearer_and_daemon_id_headers() {
    let config = test_config();
    let request = build_request(&config).expect("request");

    let headers = request.headers();
    assert_eq!(
        headers.get(AUTHORIZATION).unwrap(),
        "Bearer secret-token"
    );
    assert_eq!(headers.get("X-ElegantMC-Daemon").unwrap(), "host-1");
}

#[test]
fn parse_envelope_round_trips_a_hello_ack_frame() {
    let envelope = Envelope::new(
        FrameType::HelloAck.as_str(),
        1_700_000_000,
        json!({ "panel_id": "panel-1" }),
    );
    let text = serde_json::to_string(&envelope).expect("serialize");
    let message = Message::Text(text.into());

    let parsed = parse_envelope(&message).expect("parsed");
    assert_eq!(parsed.frame_type, "hello_ack");
    assert_eq!(parsed.payload["panel_id"], json!("panel-1"));
}

#[test]
fn parse_envelope_ignores_non_text_frames() {
    let message = Message::Binary(vec![1, 2, 3].into());
    assert!(parse_envelope(&message).is_none());
}
