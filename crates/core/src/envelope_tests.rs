// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn envelope_serializes_without_id_when_absent() {
    let env = Envelope::new("hello", 1_700_000_000, serde_json::json!({"daemon_id": "d1"}));
    let json = serde_json::to_value(&env).unwrap();
    assert!(json.get("id").is_none());
    assert_eq!(json["type"], "hello");
    assert_eq!(json["ts_unix"], 1_700_000_000);
}

#[test]
fn envelope_serializes_with_id_when_present() {
    let env = Envelope::new("command_result", 1, serde_json::json!({"ok": true}))
        .with_id("corr-1");
    let json = serde_json::to_value(&env).unwrap();
    assert_eq!(json["id"], "corr-1");
}

#[test]
fn envelope_roundtrips_through_json() {
    let env = Envelope::new("log", 5, serde_json::json!({"line": "hi"})).with_id("x");
    let s = serde_json::to_string(&env).unwrap();
    let back: Envelope = serde_json::from_str(&s).unwrap();
    assert_eq!(back.frame_type, "log");
    assert_eq!(back.id.as_deref(), Some("x"));
    assert_eq!(back.ts_unix, 5);
}

#[test]
fn frame_type_parse_round_trips_known_values() {
    for ft in [
        FrameType::Hello,
        FrameType::HelloAck,
        FrameType::Heartbeat,
        FrameType::Command,
        FrameType::CommandResult,
        FrameType::Log,
    ] {
        assert_eq!(FrameType::parse(ft.as_str()), Some(ft));
    }
}

#[test]
fn frame_type_parse_rejects_unknown() {
    assert_eq!(FrameType::parse("subscribe"), None);
}

#[test]
fn log_line_serializes_lowercase_enums() {
    let line = LogLine {
        source: LogSource::Mc,
        stream: LogStream::Stderr,
        instance: "survival01".to_string(),
        line: "boom".to_string(),
    };
    let json = serde_json::to_value(&line).unwrap();
    assert_eq!(json["source"], "mc");
    assert_eq!(json["stream"], "stderr");
}
