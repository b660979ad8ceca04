// Wi-Fi Monitor - Reconnect Policy
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Bounded-retry reconnection.
//!
//! One invocation drives the installer and probe through up to
//! `max_attempts` attempts with a fixed inter-attempt delay, stopping at
//! the first established association. A rejection of the connect
//! request itself is terminal for the whole invocation; only
//! association failures consume the attempt budget. That asymmetry is
//! deliberate and pinned by tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{MonitorConfig, NetworkTarget, ReconnectOutcome};
use crate::probe::NetworkProbe;
use crate::profile::ProfileInstaller;

/// Retry policy for one reconnection effort.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    settle_delay: Duration,
    attempt_delay: Duration,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, settle_delay: Duration, attempt_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            settle_delay,
            attempt_delay,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.reconnect_attempts,
            config.settle_delay(),
            config.reconnect_delay(),
        )
    }

    /// Run one reconnection effort to completion.
    ///
    /// Synchronous by design: the caller serializes all network
    /// mutations, so only one effort is ever in flight. The stop flag is
    /// honored between attempts; the current attempt always finishes.
    pub fn reconnect(
        &self,
        target: &NetworkTarget,
        installer: &dyn ProfileInstaller,
        probe: &dyn NetworkProbe,
        stop: &AtomicBool,
    ) -> ReconnectOutcome {
        let ssid = target.ssid();

        for attempt in 1..=self.max_attempts {
            if stop.load(Ordering::SeqCst) {
                debug!("Reconnect for \"{}\" aborted before attempt {}", ssid, attempt);
                return ReconnectOutcome::aborted(attempt - 1);
            }

            debug!(
                "Reconnect attempt {}/{} for \"{}\"",
                attempt, self.max_attempts, ssid
            );

            if !installer.install(target) {
                warn!(
                    "Connect command for \"{}\" failed on attempt {}/{}",
                    ssid, attempt, self.max_attempts
                );
                return ReconnectOutcome::command_failed(attempt, self.max_attempts);
            }

            // Give the OS's own negotiation time to complete before
            // checking whether the association took effect.
            thread::sleep(self.settle_delay);

            if probe.current_association(ssid) {
                info!("Reconnected to \"{}\" on attempt {}", ssid, attempt);
                return ReconnectOutcome::success(ssid, attempt);
            }

            if attempt < self.max_attempts {
                thread::sleep(self.attempt_delay);
            }
        }

        warn!(
            "Reconnect for \"{}\" exhausted {} attempts",
            ssid, self.max_attempts
        );
        ReconnectOutcome::exhausted(self.max_attempts)
    }
}
