// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire envelope shared by every frame crossing the Panel<->Daemon
//! WebSocket: `{ type, id?, ts_unix, payload }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every frame exchanged over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ts_unix: i64,
    pub payload: Value,
}

impl Envelope {
    pub fn new(frame_type: impl Into<String>, ts_unix: i64, payload: Value) -> Self {
        Self {
            frame_type: frame_type.into(),
            id: None,
            ts_unix,
            payload,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Known Daemon<->Panel frame types. `Envelope::frame_type` is left as a
/// plain `String` on the wire (unknown types are dropped, per the read
/// loop's contract) but the handlers match on this enum internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Hello,
    HelloAck,
    Heartbeat,
    Command,
    CommandResult,
    Log,
}

impl FrameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameType::Hello => "hello",
            FrameType::HelloAck => "hello_ack",
            FrameType::Heartbeat => "heartbeat",
            FrameType::Command => "command",
            FrameType::CommandResult => "command_result",
            FrameType::Log => "log",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hello" => Some(FrameType::Hello),
            "hello_ack" => Some(FrameType::HelloAck),
            "heartbeat" => Some(FrameType::Heartbeat),
            "command" => Some(FrameType::Command),
            "command_result" => Some(FrameType::CommandResult),
            "log" => Some(FrameType::Log),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of a streamed `log` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Mc,
    Frp,
    Install,
}

/// Which child stream a `log` line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Payload of a `log` frame: `{ source, stream, instance, line }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub source: LogSource,
    pub stream: LogStream,
    pub instance: String,
    pub line: String,
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
