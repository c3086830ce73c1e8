// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The MC supervisor: owns every managed Minecraft server process, keyed by
//! instance ID. At most one process per instance runs at a time; a single
//! reaper task per process updates state on unexpected exit.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use elegantmc_adapters::child_io::{ChildLine, ChildStream};
use elegantmc_adapters::spawn_line_forwarder;
use elegantmc_core::{InstanceId, LastExit, McInstanceState};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::error::McError;
use crate::jar;
use crate::java;

/// How long `stop()` waits after sending `stop\n` before escalating to
/// SIGTERM, and again before escalating to SIGKILL.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(60);
const SIGTERM_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters for starting a Minecraft server process.
#[derive(Debug, Clone)]
pub struct StartArgs {
    /// Bare jar filename, relative to the instance directory. Callers must
    /// validate this has no path separators or `..` before constructing a
    /// `StartArgs`; the supervisor itself only joins it onto `instance_dir`.
    pub jar_path: PathBuf,
    pub java_path: Option<String>,
    pub xms: Option<String>,
    pub xmx: Option<String>,
    pub jvm_args: Vec<String>,
}

/// A live, running instance: the pure state plus the non-serializable
/// stdin writer. The `Child` itself is owned exclusively by the reaper
/// task `start()` spawns for it, never stored here, so only one place
/// ever calls `child.wait()`.
struct ManagedInstance {
    state: McInstanceState,
    stdin: Option<ChildStdin>,
    exit_rx: Option<oneshot::Receiver<std::process::ExitStatus>>,
    start_args: Option<StartArgs>,
    workdir: PathBuf,
}

/// Callback invoked once per complete stdout/stderr line from a managed
/// process: `(instance_id, stream, line)`.
pub type LogSink = Arc<dyn Fn(&InstanceId, ChildStream, &str) + Send + Sync>;

/// Owns the table of managed Minecraft instances.
pub struct Supervisor {
    instances: Arc<Mutex<HashMap<InstanceId, ManagedInstance>>>,
    java_candidates: Vec<String>,
    log_sink: LogSink,
}

impl Supervisor {
    pub fn new(java_candidates: Vec<String>, log_sink: LogSink) -> Self {
        Self {
            instances: Arc::new(Mutex::new(HashMap::new())),
            java_candidates,
            log_sink,
        }
    }

    /// Snapshot of every known instance's pure state, for heartbeats.
    pub fn snapshot(&self) -> HashMap<InstanceId, McInstanceState> {
        self.instances
            .lock()
            .iter()
            .map(|(id, managed)| (id.clone(), managed.state.clone()))
            .collect()
    }

    pub fn is_running(&self, id: &InstanceId) -> bool {
        self.instances
            .lock()
            .get(id)
            .map(|m| m.state.running)
            .unwrap_or(false)
    }

    /// Starts a Minecraft server for `id` under `instance_dir`. Fails if an
    /// instance with this ID is already running.
    pub async fn start(
        &self,
        id: &InstanceId,
        instance_dir: PathBuf,
        args: StartArgs,
    ) -> Result<McInstanceState, McError> {
        if self.is_running(id) {
            return Err(McError::AlreadyRunning(id.as_str().to_string()));
        }

        let jar_abs = instance_dir.join(&args.jar_path);
        if !jar_abs.is_file() {
            return Err(McError::JarNotFound(jar_abs.display().to_string()));
        }

        let required_major = jar::required_java_major(&jar_abs)?;
        let (java_path, java_major) = match &args.java_path {
            Some(path) => (path.clone(), required_major),
            None => {
                let chosen = java::select(&self.java_candidates, required_major).await?;
                (chosen.path, chosen.major)
            }
        };

        let mut cmd = Command::new(&java_path);
        cmd.current_dir(&instance_dir);
        if let Some(xms) = &args.xms {
            cmd.arg(format!("-Xms{xms}"));
        }
        if let Some(xmx) = &args.xmx {
            cmd.arg(format!("-Xmx{xmx}"));
        }
        for extra in &args.jvm_args {
            cmd.arg(extra);
        }
        cmd.arg("-jar").arg(&jar_abs).arg("nogui");
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| McError::Spawn(format!("{java_path}: {e}")))?;
        let pid = child.id().ok_or_else(|| McError::Spawn("child exited immediately".to_string()))?;

        let stdin = child.stdin.take();
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

        let (exit_tx, exit_rx) = oneshot::channel();
        let instances_for_reaper = Arc::clone(&self.instances);
        let id_for_reaper = id.clone();
        tokio::spawn(async move {
            let status = child.wait().await;

            {
                let mut guard = instances_for_reaper.lock();
                if let Some(managed) = guard.get_mut(&id_for_reaper) {
                    let last_exit = match &status {
                        Ok(status) => LastExit {
                            code: status.code(),
                            signal: exit_signal(status),
                            at_unix: Some(unix_now()),
                        },
                        Err(_) => LastExit {
                            code: None,
                            signal: None,
                            at_unix: Some(unix_now()),
                        },
                    };
                    managed.state.mark_exited(last_exit);
                    managed.stdin = None;
                }
            }

            match status {
                Ok(status) => {
                    info!(instance = %id_for_reaper, ?status, "mc instance process exited");
                    let _ = exit_tx.send(status);
                }
                Err(e) => warn!(instance = %id_for_reaper, error = %e, "failed to wait on mc instance process"),
            }
        });

        let mut state = McInstanceState::not_running(java_path, java_major, required_major);
        state.mark_started(pid);

        {
            let mut guard = self.instances.lock();
            guard.insert(
                id.clone(),
                ManagedInstance {
                    state: state.clone(),
                    stdin,
                    exit_rx: Some(exit_rx),
                    start_args: Some(args),
                    workdir: instance_dir,
                },
            );
        }

        info!(instance = %id, pid, "mc instance started");
        Ok(state)
    }

    /// Sends `line` followed by a newline on the instance's stdin.
    pub async fn console(&self, id: &InstanceId, line: &str) -> Result<(), McError> {
        let mut stdin = {
            let mut guard = self.instances.lock();
            let managed = guard
                .get_mut(id)
                .ok_or_else(|| McError::Unknown(id.as_str().to_string()))?;
            managed
                .stdin
                .take()
                .ok_or_else(|| McError::Unknown(id.as_str().to_string()))?
        };

        let result = stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| McError::Spawn(format!("console write failed: {e}")));

        let mut guard = self.instances.lock();
        if let Some(managed) = guard.get_mut(id) {
            managed.stdin = Some(stdin);
        }
        result
    }

    /// Stops the instance: `stop` on stdin, escalating to SIGTERM then
    /// SIGKILL if it does not exit within the configured grace windows.
    /// `graceful_timeout` overrides the default wait before SIGTERM. A
    /// never-started or already-stopped instance is a no-op: stopping
    /// twice must be safe.
    ///
    /// The actual `child.wait()` call, and the state update it drives,
    /// live exclusively in the per-process reaper task spawned by
    /// `start()`; this only sends signals and waits on the reaper's exit
    /// notification, so the two never race to wait on the same child.
    pub async fn stop(
        &self,
        id: &InstanceId,
        graceful_timeout: Option<Duration>,
    ) -> Result<(), McError> {
        let graceful_timeout = graceful_timeout.unwrap_or(GRACEFUL_TIMEOUT);

        let (pid, stdin, exit_rx) = {
            let mut guard = self.instances.lock();
            let Some(managed) = guard.get_mut(id) else {
                return Ok(());
            };
            if !managed.state.running {
                return Ok(());
            }
            (managed.state.pid, managed.stdin.take(), managed.exit_rx.take())
        };

        let Some(mut exit_rx) = exit_rx else {
            // Reaped concurrently between the running check and here.
            return Ok(());
        };

        if let Some(mut stdin) = stdin {
            let _ = stdin.write_all(b"stop\n").await;
            let _ = stdin.flush().await;
        }

        if tokio::time::timeout(graceful_timeout, &mut exit_rx)
            .await
            .is_err()
        {
            warn!(instance = %id, "graceful stop timed out, sending SIGTERM");
            if let Some(pid) = pid {
                send_signal(pid, nix::sys::signal::Signal::SIGTERM);
            }
            if tokio::time::timeout(SIGTERM_TIMEOUT, &mut exit_rx)
                .await
                .is_err()
            {
                warn!(instance = %id, "SIGTERM timed out, sending SIGKILL");
                if let Some(pid) = pid {
                    send_signal(pid, nix::sys::signal::Signal::SIGKILL);
                }
                let _ = exit_rx.await;
            }
        }

        Ok(())
    }

    /// Stop then start with the arguments recorded at the last `start()`.
    pub async fn restart(
        &self,
        id: &InstanceId,
        graceful_timeout: Option<Duration>,
    ) -> Result<McInstanceState, McError> {
        let (workdir, args) = {
            let guard = self.instances.lock();
            let managed = guard
                .get(id)
                .ok_or_else(|| McError::Unknown(id.as_str().to_string()))?;
            let args = managed
                .start_args
                .clone()
                .ok_or_else(|| McError::Unknown(id.as_str().to_string()))?;
            (managed.workdir.clone(), args)
        };

        if self.is_running(id) {
            self.stop(id, graceful_timeout).await?;
        }
        self.start(id, workdir, args).await
    }

    /// Best-effort stop (errors ignored), then drop the table entry. The
    /// instance directory itself is removed by the caller via the sandbox.
    pub async fn delete(&self, id: &InstanceId) {
        let _ = self.stop(id, None).await;
        self.instances.lock().remove(id);
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: nix::sys::signal::Signal) {
    let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), signal);
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _signal: nix::sys::signal::Signal) {}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
