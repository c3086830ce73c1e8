// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ElegantMC Daemon
//!
//! Long-lived background process that runs on each Minecraft host: keeps
//! an outbound WebSocket connection to the Panel, executes the commands
//! it receives through [`elegantmc_executor::Dispatcher`], and streams
//! back heartbeats and child process log lines.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod backoff;
mod config;
mod panel_binding;
mod schedule_ticker;
mod ws_client;

use std::fs::File;
use std::io::Write as _;
use std::sync::Arc;

use elegantmc_adapters::ChildStream;
use elegantmc_core::{LogLine, LogSource, LogStream};
use elegantmc_executor::{Dispatcher, InstallUrls};
use elegantmc_frp::Supervisor as FrpSupervisor;
use elegantmc_fs::sandbox::Sandbox;
use elegantmc_mc::Supervisor as McSupervisor;
use fs2::FileExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{Config, ConfigError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("elegantmc-daemon {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: elegantmc-daemon [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    rotate_log_if_needed(&config.log_path());
    write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!("starting elegantmc-daemon for {}", config.daemon_id);

    let lock_file = match acquire_lock(&config) {
        Ok(f) => f,
        Err(StartupError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(config.pid_path()).unwrap_or_default();
            eprintln!("elegantmc-daemon is already running");
            if !pid.trim().is_empty() {
                eprintln!("  pid: {}", pid.trim());
            }
            drop(log_guard);
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };
    std::fs::write(config.version_path(), env!("CARGO_PKG_VERSION"))?;

    let sandbox = Sandbox::new(config.sandbox_root())?;

    let (log_tx, log_rx) = mpsc::unbounded_channel::<LogLine>();

    let mc_log_tx = log_tx.clone();
    let mc = Arc::new(McSupervisor::new(
        config.java_candidates.clone(),
        Arc::new(move |instance_id, stream, line| {
            let _ = mc_log_tx.send(LogLine {
                source: LogSource::Mc,
                stream: map_stream(stream),
                instance: instance_id.as_str().to_string(),
                line: line.to_string(),
            });
        }),
    ));

    let frp_log_tx = log_tx.clone();
    let frp = Arc::new(FrpSupervisor::new(
        config.frpc_path.clone(),
        Arc::new(move |instance_id, stream, line| {
            let _ = frp_log_tx.send(LogLine {
                source: LogSource::Frp,
                stream: map_stream(stream),
                instance: instance_id.as_str().to_string(),
                line: line.to_string(),
            });
        }),
        Arc::new(elegantmc_core::SystemClock),
    ));

    let install_log_tx = log_tx.clone();
    let dispatcher = Arc::new(Dispatcher::new(
        sandbox,
        Arc::clone(&mc),
        Arc::clone(&frp),
        Arc::new(elegantmc_core::SystemClock),
        install_urls(&config),
        Arc::new(move |instance_id, line| {
            let _ = install_log_tx.send(LogLine {
                source: LogSource::Install,
                stream: LogStream::Stdout,
                instance: instance_id.to_string(),
                line: line.to_string(),
            });
        }),
    ));
    drop(log_tx);

    let shutdown = CancellationToken::new();

    let ticker_handle = tokio::spawn(schedule_ticker::run(
        Arc::clone(&dispatcher),
        shutdown.clone(),
    ));

    let ws_handle = tokio::spawn(ws_client::run(
        Arc::new(config.clone()),
        Arc::clone(&dispatcher),
        Arc::clone(&mc),
        Arc::clone(&frp),
        log_rx,
        shutdown.clone(),
    ));

    wait_for_shutdown_signal().await;
    info!("shutdown signal received");

    // Cancels the heartbeat/read loop and the WS connection, but does NOT
    // stop any spawned MC/frpc children: an operator-visible restart of
    // this daemon must not take down servers it was only supervising.
    shutdown.cancel();

    let _ = ws_handle.await;
    let _ = ticker_handle.await;

    cleanup(&config);
    info!("elegantmc-daemon stopped");
    drop(log_guard);
    let _ = lock_file;
    Ok(())
}

fn install_urls(config: &Config) -> InstallUrls {
    let mut urls = InstallUrls::default();
    if let Some(base) = &config.mojang_base_url {
        urls.mojang_base_url = base.clone();
    }
    if let Some(base) = &config.paper_base_url {
        urls.paper_base_url = base.clone();
    }
    urls
}

fn map_stream(stream: ChildStream) -> LogStream {
    match stream {
        ChildStream::Stdout => LogStream::Stdout,
        ChildStream::Stderr => LogStream::Stderr,
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("install SIGINT handler");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn acquire_lock(config: &Config) -> Result<File, StartupError> {
    if let Some(parent) = config.pid_path().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(config.pid_path())?;
    lock_file
        .try_lock_exclusive()
        .map_err(StartupError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

fn cleanup(config: &Config) {
    let _ = std::fs::remove_file(config.pid_path());
    let _ = std::fs::remove_file(config.version_path());
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Best-effort:
/// rotation failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

const STARTUP_MARKER_PREFIX: &str = "--- elegantmc-daemon: starting (pid: ";

fn write_startup_marker(config: &Config) -> std::io::Result<()> {
    if let Some(parent) = config.log_path().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    writeln!(
        file,
        "{}{}) ---\n",
        STARTUP_MARKER_PREFIX,
        std::process::id()
    )?;
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path().parent() {
        std::fs::create_dir_all(parent)?;
    }

    let log_path = config.log_path();
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().expect("log path has a parent"),
        log_path.file_name().expect("log path has a file name"),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

fn print_help() {
    println!("elegantmc-daemon {}", env!("CARGO_PKG_VERSION"));
    println!("Per-host agent that connects this machine to an ElegantMC panel.");
    println!();
    println!("USAGE:");
    println!("    elegantmc-daemon");
    println!();
    println!("Configured entirely through ELEGANTMC_* environment variables");
    println!("(ELEGANTMC_PANEL_URL, ELEGANTMC_DAEMON_ID, ELEGANTMC_TOKEN are required).");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
