// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket connection lifecycle: dial, hello/hello_ack handshake, panel
//! binding, heartbeat, command dispatch, and log fan-out. One call to
//! [`run`] owns the reconnect loop for the life of the daemon process.

use std::sync::Arc;
use std::time::Duration;

use elegantmc_core::{Clock, Envelope, FrameType, LogLine, SystemClock};
use elegantmc_executor::Dispatcher;
use elegantmc_frp::Supervisor as FrpSupervisor;
use elegantmc_mc::Supervisor as McSupervisor;
use elegantmc_sysinfo::{build_heartbeat, ProcessSampler};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use sysinfo::System;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backoff::Backoff;
use crate::config::Config;
use crate::panel_binding;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = Arc<Mutex<futures_util::stream::SplitSink<WsStream, Message>>>;

/// How long a single outbound frame is allowed to take before it is
/// dropped. Back-pressure is enforced per-write, not by queue depth.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const HELLO_ACK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum WsError {
    #[error("websocket error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid header value: {0}")]
    Header(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),
    #[error("timed out waiting for hello_ack")]
    HelloAckTimeout,
    #[error("connection closed before hello_ack")]
    ConnectionClosed,
    #[error("unexpected frame from panel")]
    UnexpectedFrame,
    #[error("panel identity mismatch: bound to {expected}, got {actual}")]
    PanelMismatch { expected: String, actual: String },
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),
}

/// Run the reconnect loop until `shutdown` is cancelled.
///
/// `log_rx` receives every line produced by the MC/FRP supervisors and the
/// installer progress callbacks; each is forwarded as a `log` frame on
/// whichever connection happens to be live, and dropped on the floor while
/// disconnected (there is no log replay buffer).
#[allow(clippy::too_many_arguments)]
pub async fn run(
    config: Arc<Config>,
    dispatcher: Arc<Dispatcher>,
    mc: Arc<McSupervisor>,
    frp: Arc<FrpSupervisor>,
    mut log_rx: mpsc::UnboundedReceiver<LogLine>,
    shutdown: CancellationToken,
) {
    let mut backoff = Backoff::new(config.reconnect_min, config.reconnect_max);
    let mut system = System::new_all();
    let mut sampler = ProcessSampler::new();

    while !shutdown.is_cancelled() {
        match connect_and_serve(
            &config,
            &dispatcher,
            &mc,
            &frp,
            &mut log_rx,
            &mut system,
            &mut sampler,
            &shutdown,
            &mut backoff,
        )
        .await
        {
            Ok(()) => info!("panel connection ended"),
            Err(e) => warn!(error = %e, "panel connection failed"),
        }

        if shutdown.is_cancelled() {
            break;
        }

        let delay = backoff.next();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.cancelled() => break,
        }
    }

    info!("websocket client stopped");
}

fn build_request(
    config: &Config,
) -> Result<tokio_tungstenite::tungstenite::http::Request<()>, WsError> {
    let mut request = config.panel_url.as_str().into_client_request()?;
    let headers = request.headers_mut();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.token))?,
    );
    headers.insert(
        "X-ElegantMC-Daemon",
        HeaderValue::from_str(&config.daemon_id)?,
    );
    Ok(request)
}

#[allow(clippy::too_many_arguments)]
async fn connect_and_serve(
    config: &Config,
    dispatcher: &Arc<Dispatcher>,
    mc: &Arc<McSupervisor>,
    frp: &Arc<FrpSupervisor>,
    log_rx: &mut mpsc::UnboundedReceiver<LogLine>,
    system: &mut System,
    sampler: &mut ProcessSampler,
    shutdown: &CancellationToken,
    backoff: &mut Backoff,
) -> Result<(), WsError> {
    let request = build_request(config)?;
    let (ws_stream, _response) = connect_async(request).await?;
    info!(panel_url = %config.panel_url, "connected to panel");

    let (write, mut read) = ws_stream.split();
    let write: WsWriter = Arc::new(Mutex::new(write));

    send_envelope(
        &write,
        FrameType::Hello.as_str(),
        json!({
            "daemon_id": config.daemon_id,
            "version": env!("CARGO_PKG_VERSION"),
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "features": ["mc", "frp", "fs", "backup", "schedule"],
        }),
    )
    .await?;

    let ack = tokio::time::timeout(HELLO_ACK_TIMEOUT, read.next())
        .await
        .map_err(|_| WsError::HelloAckTimeout)?
        .ok_or(WsError::ConnectionClosed)??;
    let ack_envelope = parse_envelope(&ack).ok_or(WsError::UnexpectedFrame)?;
    if ack_envelope.frame_type != FrameType::HelloAck.as_str() {
        return Err(WsError::UnexpectedFrame);
    }
    let panel_id = ack_envelope
        .payload
        .get("panel_id")
        .and_then(Value::as_str)
        .ok_or(WsError::UnexpectedFrame)?
        .to_string();

    if config.panel_binding {
        bind_to_panel(config, &panel_id).await?;
    }
    backoff.reset();
    info!(%panel_id, "hello_ack received");

    let mut heartbeat_tick = tokio::time::interval(config.heartbeat);
    heartbeat_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(envelope) = parse_envelope(&Message::Text(text)) {
                            handle_frame(envelope, dispatcher, &write);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("panel closed the connection");
                        return Ok(());
                    }
                    Some(Ok(_)) => {} // ping/pong/binary: ignore
                    Some(Err(e)) => return Err(e.into()),
                }
            }

            line = log_rx.recv() => {
                let Some(line) = line else {
                    // Senders are held by the long-lived supervisors; a
                    // closed channel means the daemon is tearing down.
                    return Ok(());
                };
                let payload = serde_json::to_value(&line).unwrap_or(Value::Null);
                if let Err(e) = send_envelope(&write, FrameType::Log.as_str(), payload).await {
                    warn!(error = %e, "failed to send log frame");
                }
            }

            _ = heartbeat_tick.tick() => {
                system.refresh_memory();
                system.refresh_cpu_usage();
                let frp_proxies = frp.snapshot().into_values().collect();
                let mc_instances = mc
                    .snapshot()
                    .into_iter()
                    .map(|(id, state)| (id.as_str().to_string(), state))
                    .collect();
                let snapshot = build_heartbeat(
                    SystemClock.now_unix(),
                    system,
                    sampler,
                    &config.sandbox_root(),
                    &config.preferred_addrs,
                    frp_proxies,
                    mc_instances,
                );
                let payload = serde_json::to_value(&snapshot).unwrap_or(Value::Null);
                if let Err(e) = send_envelope(&write, FrameType::Heartbeat.as_str(), payload).await {
                    warn!(error = %e, "failed to send heartbeat");
                }
            }

            _ = shutdown.cancelled() => {
                info!("shutdown requested, closing panel connection");
                let mut guard = write.lock().await;
                let _ = guard.close().await;
                return Ok(());
            }
        }
    }
}

async fn bind_to_panel(config: &Config, panel_id: &str) -> Result<(), WsError> {
    let path = config.panel_binding_path();
    match panel_binding::load(&path).await.map_err(WsError::Io)? {
        Some(existing) if existing.panel_id != panel_id => Err(WsError::PanelMismatch {
            expected: existing.panel_id,
            actual: panel_id.to_string(),
        }),
        Some(_) => Ok(()),
        None => panel_binding::save(&path, panel_id).await.map_err(WsError::Io),
    }
}

fn handle_frame(envelope: Envelope, dispatcher: &Arc<Dispatcher>, write: &WsWriter) {
    if envelope.frame_type != FrameType::Command.as_str() {
        return;
    }
    let Some(name) = envelope
        .payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        warn!("command frame missing \"name\"");
        return;
    };
    let args = envelope
        .payload
        .get("args")
        .cloned()
        .unwrap_or(Value::Null);
    let id = envelope.id;

    let dispatcher = Arc::clone(dispatcher);
    let write = Arc::clone(write);
    tokio::spawn(async move {
        let result = dispatcher.dispatch(&name, args).await;
        let payload = serde_json::to_value(&result).unwrap_or_else(|_| {
            json!({ "ok": false, "error": "failed to serialize command result" })
        });
        let mut out = Envelope::new(FrameType::CommandResult.as_str(), SystemClock.now_unix(), payload);
        if let Some(id) = id {
            out = out.with_id(id);
        }
        if let Err(e) = send_envelope_value(&write, out).await {
            warn!(command = %name, error = %e, "failed to send command_result");
        }
    });
}

async fn send_envelope(write: &WsWriter, frame_type: &str, payload: Value) -> Result<(), WsError> {
    let envelope = Envelope::new(frame_type, SystemClock.now_unix(), payload);
    send_envelope_value(write, envelope).await
}

async fn send_envelope_value(write: &WsWriter, envelope: Envelope) -> Result<(), WsError> {
    let text = serde_json::to_string(&envelope).unwrap_or_else(|_| "{}".to_string());
    let mut guard = write.lock().await;
    tokio::time::timeout(WRITE_TIMEOUT, guard.send(Message::Text(text.into())))
        .await
        .map_err(|_| {
            WsError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "write timed out",
            ))
        })??;
    Ok(())
}

fn parse_envelope(message: &Message) -> Option<Envelope> {
    match message {
        Message::Text(text) => serde_json::from_str(text).ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "ws_client_tests.rs"]
mod tests;
