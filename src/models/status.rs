// Wi-Fi Monitor - Status Types
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Result and event types flowing from the monitor core to the
//! presentation layer.

use chrono::{DateTime, Local};

/// What one poll cycle observed about the target network.
///
/// Recomputed fresh on every cycle, never cached. The checks
/// short-circuit: `associated` is only probed when the network is
/// visible, and `internet_reachable` only when associated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeResult {
    /// The target network is visible in a scan.
    pub visible: bool,
    /// The host is actively associated with the target network.
    pub associated: bool,
    /// A transport-level connection to the internet can be established.
    pub internet_reachable: bool,
}

/// Outcome of one reconnection effort.
///
/// Produced once per `ReconnectPolicy` invocation and consumed
/// immediately by the monitor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectOutcome {
    /// Whether association was established.
    pub succeeded: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// How many attempts the effort consumed.
    pub attempts_used: u32,
}

impl ReconnectOutcome {
    /// Association established on attempt `attempt`.
    pub fn success(ssid: &str, attempt: u32) -> Self {
        Self {
            succeeded: true,
            message: format!("connected to {}", ssid),
            attempts_used: attempt,
        }
    }

    /// The connect request itself was rejected on attempt `attempt`.
    /// Terminal for the whole effort.
    pub fn command_failed(attempt: u32, max_attempts: u32) -> Self {
        Self {
            succeeded: false,
            message: format!(
                "attempt {}/{}: connect command failed",
                attempt, max_attempts
            ),
            attempts_used: attempt,
        }
    }

    /// The full attempt budget ran without association.
    pub fn exhausted(max_attempts: u32) -> Self {
        Self {
            succeeded: false,
            message: format!("failed after {} attempts", max_attempts),
            attempts_used: max_attempts,
        }
    }

    /// A stop request interrupted the effort between attempts.
    pub fn aborted(attempts_used: u32) -> Self {
        Self {
            succeeded: false,
            message: "reconnect aborted by stop request".to_string(),
            attempts_used,
        }
    }
}

/// Event delivered to the presentation layer.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A status line. `new_entry` is true when the text differs from the
    /// previously emitted status (a new log line rather than an
    /// in-place refresh).
    Status {
        text: String,
        new_entry: bool,
        timestamp: DateTime<Local>,
    },
    /// The connected signal for this cycle.
    Connectivity { connected: bool },
}

impl MonitorEvent {
    /// Build a status event stamped with the current local time.
    pub fn status(text: impl Into<String>, new_entry: bool) -> Self {
        Self::Status {
            text: text.into(),
            new_entry,
            timestamp: Local::now(),
        }
    }
}
