// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented forwarding of a child process's stdout/stderr to an
//! unbounded channel, one task per stream.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Which stream a forwarded line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStream {
    Stdout,
    Stderr,
}

/// A single line read from a child process, tagged with its stream.
#[derive(Debug, Clone)]
pub struct ChildLine {
    pub stream: ChildStream,
    pub line: String,
}

/// Spawn a task that reads `reader` line-by-line and forwards each line
/// tagged with `stream` to `tx`. The task exits silently on EOF or once
/// the receiver is dropped.
pub fn spawn_line_forwarder<R>(
    stream: ChildStream,
    reader: R,
    tx: mpsc::UnboundedSender<ChildLine>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(ChildLine { stream, line }).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(?stream, error = %err, "child stream read error");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "child_io_tests.rs"]
mod tests;
