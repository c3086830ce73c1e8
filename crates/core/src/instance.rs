// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance identity: the key used for the MC instance table, the FRP proxy
//! table, and the sandbox directory name under `servers/`.

use std::sync::LazyLock;

use regex::Regex;

static INSTANCE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,63}$").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum InstanceIdError {
    #[error("instance id must not be empty")]
    Empty,
    #[error("instance id {0:?} does not match ^[A-Za-z0-9][A-Za-z0-9._-]{{0,63}}$")]
    InvalidFormat(String),
}

/// An instance ID: both the key in the MC/FRP state tables and the name of
/// a direct child directory of the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InstanceIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InstanceIdError::Empty);
        }
        if !INSTANCE_ID_PATTERN.is_match(&raw) {
            return Err(InstanceIdError::InvalidFormat(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for InstanceId {
    type Err = InstanceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InstanceId {
    type Error = InstanceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<InstanceId> for String {
    fn from(value: InstanceId) -> Self {
        value.0
    }
}

impl std::borrow::Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
