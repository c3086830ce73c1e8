// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accepts_simple_alphanumeric() {
    assert!(InstanceId::parse("survival01").is_ok());
}

#[test]
fn accepts_dots_underscores_hyphens() {
    assert!(InstanceId::parse("my.server_1-beta").is_ok());
}

#[test]
fn rejects_empty() {
    assert!(matches!(InstanceId::parse(""), Err(InstanceIdError::Empty)));
}

#[test]
fn rejects_leading_dot() {
    assert!(InstanceId::parse(".hidden").is_err());
}

#[test]
fn rejects_leading_hyphen() {
    assert!(InstanceId::parse("-oops").is_err());
}

#[test]
fn rejects_path_traversal() {
    assert!(InstanceId::parse("../escape").is_err());
}

#[test]
fn rejects_slash() {
    assert!(InstanceId::parse("a/b").is_err());
}

#[test]
fn rejects_over_64_chars() {
    let too_long = "a".repeat(65);
    assert!(InstanceId::parse(too_long).is_err());
}

#[test]
fn accepts_exactly_64_chars() {
    let max_len = "a".repeat(64);
    assert!(InstanceId::parse(max_len).is_ok());
}

#[test]
fn display_roundtrips_through_string() {
    let id = InstanceId::parse("survival01").unwrap();
    assert_eq!(id.to_string(), "survival01");
    assert_eq!(id.as_str(), "survival01");
}

#[test]
fn serde_roundtrip() {
    let id = InstanceId::parse("survival01").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"survival01\"");
    let back: InstanceId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn serde_rejects_invalid_on_deserialize() {
    let err = serde_json::from_str::<InstanceId>("\"../bad\"");
    assert!(err.is_err());
}
