// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect backoff for the WebSocket client: exponential with jitter,
//! reset on a successful `hello_ack`.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            current: min,
        }
    }

    /// The delay to wait before the next reconnect attempt, plus jitter of
    /// up to +1/3 of the base delay. Doubles the base delay for next time,
    /// capped at `max`.
    pub fn next(&mut self) -> Duration {
        let base = self.current;
        self.current = (self.current * 2).min(self.max);

        let jitter_fraction: f64 = rand::rng().random_range(0.0..(1.0 / 3.0));
        let jitter = Duration::from_secs_f64(base.as_secs_f64() * jitter_fraction);
        base + jitter
    }

    /// Reset to the minimum delay after a successful connection handshake.
    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
