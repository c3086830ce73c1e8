// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrpError {
    #[error("proxy {0} is already running")]
    AlreadyRunning(String),
    #[error("proxy {0} is not known to this supervisor")]
    Unknown(String),
    #[error("failed to render frpc config: {0}")]
    ConfigRender(#[from] toml::ser::Error),
    #[error("failed to spawn frpc: {0}")]
    Spawn(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
