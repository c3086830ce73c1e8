// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("ELEGANTMC_PANEL_URL is required")]
    MissingPanelUrl,
    #[error("ELEGANTMC_DAEMON_ID is required")]
    MissingDaemonId,
    #[error("ELEGANTMC_TOKEN is required")]
    MissingToken,
}

/// Everything the daemon binary reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub panel_url: String,
    pub daemon_id: String,
    pub token: String,
    pub state_dir: PathBuf,
    pub heartbeat: Duration,
    pub reconnect_min: Duration,
    pub reconnect_max: Duration,
    pub java_candidates: Vec<String>,
    pub preferred_addrs: Vec<String>,
    pub mojang_base_url: Option<String>,
    pub paper_base_url: Option<String>,
    pub frpc_path: String,
    pub health_file: Option<PathBuf>,
    pub panel_binding: bool,
}

impl Config {
    /// Load configuration from `ELEGANTMC_*` environment variables.
    ///
    /// `panel_url`/`daemon_id`/`token` have no sane defaults and are
    /// required; everything else falls back to a hardcoded default.
    pub fn load() -> Result<Self, ConfigError> {
        let panel_url = env_var("ELEGANTMC_PANEL_URL").ok_or(ConfigError::MissingPanelUrl)?;
        let daemon_id = env_var("ELEGANTMC_DAEMON_ID").ok_or(ConfigError::MissingDaemonId)?;
        let token = env_var("ELEGANTMC_TOKEN").ok_or(ConfigError::MissingToken)?;
        let state_dir = state_dir()?;

        Ok(Self {
            panel_url,
            daemon_id,
            token,
            state_dir,
            heartbeat: env_duration_ms("ELEGANTMC_HEARTBEAT_MS", Duration::from_secs(10)),
            reconnect_min: env_duration_ms("ELEGANTMC_RECONNECT_MIN_MS", Duration::from_secs(1)),
            reconnect_max: env_duration_ms("ELEGANTMC_RECONNECT_MAX_MS", Duration::from_secs(30)),
            java_candidates: env_list("ELEGANTMC_JAVA_CANDIDATES", &["java"]),
            preferred_addrs: env_list("ELEGANTMC_PREFERRED_ADDRS", &[]),
            mojang_base_url: env_var("ELEGANTMC_MOJANG_BASE_URL"),
            paper_base_url: env_var("ELEGANTMC_PAPER_BASE_URL"),
            frpc_path: env_var("ELEGANTMC_FRPC_PATH").unwrap_or_else(|| "frpc".to_string()),
            health_file: env_var("ELEGANTMC_HEALTH_FILE").map(PathBuf::from),
            panel_binding: env_var("ELEGANTMC_PANEL_BINDING").as_deref() == Some("1"),
        })
    }

    pub fn pid_path(&self) -> PathBuf {
        self.state_dir.join("daemon.pid")
    }

    pub fn version_path(&self) -> PathBuf {
        self.state_dir.join("daemon.version")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("daemon.log")
    }

    pub fn panel_binding_path(&self) -> PathBuf {
        self.state_dir.join("panel_binding.json")
    }

    pub fn sandbox_root(&self) -> PathBuf {
        self.state_dir.join("sandbox")
    }
}

/// Resolve state directory: `ELEGANTMC_STATE_DIR` > `XDG_STATE_HOME/elegantmc`
/// > `~/.local/state/elegantmc`.
fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env_var("ELEGANTMC_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = env_var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("elegantmc"));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/elegantmc"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_duration_ms(name: &str, default: Duration) -> Duration {
    env_var(name)
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_list(name: &str, default: &[&str]) -> Vec<String> {
    match env_var(name) {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
