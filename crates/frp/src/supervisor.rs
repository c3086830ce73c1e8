// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owns the set of `frpc` child processes, one per proxy, keyed by proxy
//! name (which is also the instance ID it tunnels for). Proxies are
//! independent; stopping one never touches another.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use elegantmc_adapters::child_io::{ChildLine, ChildStream};
use elegantmc_adapters::spawn_line_forwarder;
use elegantmc_core::{Clock, FrpProxyState, InstanceId};
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::config::{self, ProxyConfig};
use crate::error::FrpError;

const SIGTERM_TIMEOUT: Duration = Duration::from_secs(5);

struct ManagedProxy {
    state: FrpProxyState,
    child: Child,
    args: ProxyConfig,
}

/// Callback invoked once per complete stdout/stderr line from a managed
/// `frpc` process: `(proxy_name, stream, line)`.
pub type LogSink = Arc<dyn Fn(&InstanceId, ChildStream, &str) + Send + Sync>;

pub struct Supervisor {
    frpc_path: String,
    proxies: Mutex<HashMap<InstanceId, ManagedProxy>>,
    log_sink: LogSink,
    clock: Arc<dyn Clock>,
}

impl Supervisor {
    pub fn new(frpc_path: impl Into<String>, log_sink: LogSink, clock: Arc<dyn Clock>) -> Self {
        Self {
            frpc_path: frpc_path.into(),
            proxies: Mutex::new(HashMap::new()),
            log_sink,
            clock,
        }
    }

    pub fn snapshot(&self) -> HashMap<InstanceId, FrpProxyState> {
        self.proxies
            .lock()
            .iter()
            .map(|(id, managed)| (id.clone(), managed.state.clone()))
            .collect()
    }

    pub fn is_running(&self, id: &InstanceId) -> bool {
        self.proxies.lock().contains_key(id)
    }

    /// Writes `<workdir>/<id>.toml` and spawns `frpc -c <that file>`.
    pub async fn start(
        &self,
        id: &InstanceId,
        workdir: PathBuf,
        args: ProxyConfig,
    ) -> Result<FrpProxyState, FrpError> {
        if self.is_running(id) {
            return Err(FrpError::AlreadyRunning(id.as_str().to_string()));
        }

        tokio::fs::create_dir_all(&workdir).await?;
        let config_path = workdir.join(format!("{}.toml", id.as_str()));
        let rendered = config::render(&args)?;
        tokio::fs::write(&config_path, rendered).await?;

        let mut cmd = Command::new(&self.frpc_path);
        cmd.current_dir(&workdir);
        cmd.arg("-c").arg(&config_path);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| FrpError::Spawn(format!("{}: {e}", self.frpc_path)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, mut rx) = mpsc::unbounded_channel::<ChildLine>();
        if let Some(stdout) = stdout {
            spawn_line_forwarder(ChildStream::Stdout, stdout, tx.clone());
        }
        if let Some(stderr) = stderr {
            spawn_line_forwarder(ChildStream::Stderr, stderr, tx);
        }

        let sink = Arc::clone(&self.log_sink);
        let id_for_lines = id.clone();
        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                sink(&id_for_lines, line.stream, &line.line);
            }
        });

        let remote_addr = format!("{}:{}", args.server_addr, args.remote_port);
        let state = FrpProxyState::new(
            id.as_str(),
            args.server_addr.clone(),
            remote_addr,
            args.remote_port,
            self.clock.now_unix(),
            workdir.display().to_string(),
        );

        let pid = child.id();
        self.proxies.lock().insert(
            id.clone(),
            ManagedProxy {
                state: state.clone(),
                child,
                args,
            },
        );

        info!(proxy = %id, ?pid, "frp proxy started");
        Ok(state)
    }

    /// Terminates one proxy: SIGTERM, escalating to SIGKILL if it doesn't
    /// exit within `SIGTERM_TIMEOUT`.
    pub async fn stop(&self, id: &InstanceId) -> Result<(), FrpError> {
        let mut managed = {
            let mut guard = self.proxies.lock();
            guard
                .remove(id)
                .ok_or_else(|| FrpError::Unknown(id.as_str().to_string()))?
        };

        terminate(id, &mut managed.child).await;
        info!(proxy = %id, "frp proxy stopped");
        Ok(())
    }

    /// Terminates every running proxy.
    pub async fn stop_all(&self) {
        let ids: Vec<InstanceId> = self.proxies.lock().keys().cloned().collect();
        for id in ids {
            let _ = self.stop(&id).await;
        }
    }

    /// Stop then start with the config recorded at the last `start()`.
    pub async fn restart(&self, id: &InstanceId) -> Result<FrpProxyState, FrpError> {
        let (workdir, args) = {
            let guard = self.proxies.lock();
            let managed = guard
                .get(id)
                .ok_or_else(|| FrpError::Unknown(id.as_str().to_string()))?;
            (
                PathBuf::from(managed.state.workdir.clone()),
                managed.args.clone(),
            )
        };

        self.stop(id).await?;
        self.start(id, workdir, args).await
    }
}

async fn terminate(id: &InstanceId, child: &mut Child) {
    send_signal(child, nix::sys::signal::Signal::SIGTERM);
    match tokio::time::timeout(SIGTERM_TIMEOUT, child.wait()).await {
        Ok(_) => {}
        Err(_) => {
            warn!(proxy = %id, "frpc did not exit after SIGTERM, sending SIGKILL");
            let _ = child.kill().await;
            let _ = child.wait().await;
        }
    }
}

#[cfg(unix)]
fn send_signal(child: &Child, signal: nix::sys::signal::Signal) {
    if let Some(pid) = child.id() {
        let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), signal);
    }
}

#[cfg(not(unix))]
fn send_signal(_child: &Child, _signal: nix::sys::signal::Signal) {}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
