// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{ ok, output? }` / `{ ok: false, error }` shape every command
//! handler resolves to, regardless of which internal error type it hit.

use serde::Serialize;
use serde_json::Value;

use crate::error::ExecutorError;

#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok(output: Value) -> Self {
        Self {
            ok: true,
            output: Some(output),
            error: None,
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            ok: true,
            output: None,
            error: None,
        }
    }

    pub fn err(message: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            output: None,
            error: Some(message.to_string()),
        }
    }

    pub fn from_result(result: Result<Value, ExecutorError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => Self::err(err),
        }
    }
}
