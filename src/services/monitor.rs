// Wi-Fi Monitor - Monitor Loop
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! The top-level monitoring cycle.
//!
//! A single background worker polls the probe on a fixed cadence,
//! invokes the reconnect policy when the network is visible but not
//! associated, and emits status transitions over a bounded channel to
//! the presentation layer. The worker is stopped cooperatively: the
//! stop flag is checked at the top of each cycle and the thread is
//! joined, never interrupted mid-cycle.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::models::{MonitorConfig, MonitorEvent, NetworkTarget, ProbeResult};
use crate::probe::{NetworkProbe, NmcliProbe};
use crate::profile::{NmcliInstaller, ProfileInstaller};
use crate::services::ReconnectPolicy;

/// Capacity of the event channel to the presentation layer. The worker
/// drops events rather than block when the consumer falls this far
/// behind.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Status text for the reserved maintenance check.
const MAINTENANCE_STATUS: &str = "running periodic maintenance check";

/// Owns the monitoring session configuration and spawns the worker.
pub struct MonitorService {
    config: MonitorConfig,
    target: NetworkTarget,
}

impl MonitorService {
    pub fn new(config: MonitorConfig, target: NetworkTarget) -> Self {
        Self { config, target }
    }

    /// Spawn the background worker against the real nmcli probe and
    /// installer. Returns the stop handle and the event stream.
    pub fn spawn(self) -> (MonitorHandle, Receiver<MonitorEvent>) {
        let probe = Box::new(NmcliProbe::new(&self.config));
        let installer = Box::new(NmcliInstaller::new(&self.config));
        self.spawn_with(probe, installer)
    }

    /// Spawn the worker with explicit probe and installer
    /// implementations.
    pub fn spawn_with(
        self,
        probe: Box<dyn NetworkProbe>,
        installer: Box<dyn ProfileInstaller>,
    ) -> (MonitorHandle, Receiver<MonitorEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let mut worker = MonitorWorker::new(
            self.config,
            self.target,
            probe,
            installer,
            tx,
            Arc::clone(&stop),
        );
        let handle = thread::Builder::new()
            .name("wifi-monitor".to_string())
            .spawn(move || worker.run())
            .expect("failed to spawn monitor worker");

        (
            MonitorHandle {
                stop,
                worker: Some(handle),
            },
            rx,
        )
    }
}

/// Cooperative stop handle for the background worker.
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Request a stop and wait for the worker to finish its current
    /// cycle. Blocks for up to a full reconnect effort if one is in
    /// flight; that latency is an accepted design cost.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Monitor worker terminated abnormally");
            }
        }
    }

    /// Whether the worker has already exited.
    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map(|h| h.is_finished())
            .unwrap_or(true)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Per-cycle bookkeeping owned exclusively by the worker.
#[derive(Debug, Default)]
struct MonitorState {
    last_status: Option<String>,
    #[allow(dead_code)]
    last_emitted_changed: bool,
}

/// What the worker loop should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleFlow {
    Continue,
    Shutdown,
}

pub(crate) struct MonitorWorker {
    config: MonitorConfig,
    target: NetworkTarget,
    probe: Box<dyn NetworkProbe>,
    installer: Box<dyn ProfileInstaller>,
    policy: ReconnectPolicy,
    events: Sender<MonitorEvent>,
    stop: Arc<AtomicBool>,
    state: MonitorState,
    last_maintenance: Instant,
}

impl MonitorWorker {
    pub(crate) fn new(
        config: MonitorConfig,
        target: NetworkTarget,
        probe: Box<dyn NetworkProbe>,
        installer: Box<dyn ProfileInstaller>,
        events: Sender<MonitorEvent>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let policy = ReconnectPolicy::from_config(&config);
        Self {
            config,
            target,
            probe,
            installer,
            policy,
            events,
            stop,
            state: MonitorState::default(),
            last_maintenance: Instant::now(),
        }
    }

    pub(crate) fn run(&mut self) {
        info!("Monitoring \"{}\"", self.target.ssid());

        while !self.stop.load(Ordering::SeqCst) {
            let flow = panic::catch_unwind(AssertUnwindSafe(|| self.cycle()));
            match flow {
                Ok(CycleFlow::Continue) => thread::sleep(self.config.poll_interval()),
                Ok(CycleFlow::Shutdown) => break,
                Err(cause) => {
                    let description = panic_description(cause.as_ref());
                    warn!("Monitor cycle failed: {}", description);
                    let status = format!("monitoring error: {}", description);
                    if self.emit_status(&status) == CycleFlow::Shutdown {
                        break;
                    }
                    // Extended cooldown so a persistently failing cycle
                    // does not spin.
                    thread::sleep(self.config.recovery_delay());
                }
            }
        }

        info!("Monitor worker for \"{}\" stopped", self.target.ssid());
    }

    /// One poll cycle. Exposed to tests, which drive it directly.
    pub(crate) fn cycle(&mut self) -> CycleFlow {
        let observed = self.observe();
        debug!(
            "Cycle observed visible={} associated={} internet={}",
            observed.visible, observed.associated, observed.internet_reachable
        );

        let (status, connected) = if !observed.visible {
            ("network not found".to_string(), false)
        } else if observed.associated {
            if self.maintenance_due() && self.maintenance_check() == CycleFlow::Shutdown {
                return CycleFlow::Shutdown;
            }
            let status = if observed.internet_reachable {
                "connected, internet available"
            } else {
                "connected, no internet"
            };
            (status.to_string(), true)
        } else {
            if self.emit_status("network found, connecting...") == CycleFlow::Shutdown {
                return CycleFlow::Shutdown;
            }
            let outcome = self.policy.reconnect(
                &self.target,
                self.installer.as_ref(),
                self.probe.as_ref(),
                &self.stop,
            );
            (outcome.message, outcome.succeeded)
        };

        if self.emit_status(&status) == CycleFlow::Shutdown {
            return CycleFlow::Shutdown;
        }
        self.emit(MonitorEvent::Connectivity { connected })
    }

    /// Query the probe, short-circuiting the way the status logic does:
    /// association is only meaningful when visible, internet only when
    /// associated.
    fn observe(&self) -> ProbeResult {
        let ssid = self.target.ssid();
        let visible = self.probe.is_network_visible(ssid);
        let associated = visible && self.probe.current_association(ssid);
        let internet_reachable = associated && self.probe.has_internet();
        ProbeResult {
            visible,
            associated,
            internet_reachable,
        }
    }

    fn maintenance_due(&self) -> bool {
        self.last_maintenance.elapsed() >= self.config.maintenance_interval()
    }

    /// Reserved extension point: today the maintenance check only emits
    /// an informational status on its own wall-clock interval.
    fn maintenance_check(&mut self) -> CycleFlow {
        self.last_maintenance = Instant::now();
        debug!("Maintenance check for \"{}\"", self.target.ssid());
        self.emit(MonitorEvent::status(MAINTENANCE_STATUS, true))
    }

    /// Emit a status line, flagging whether it differs from the
    /// previous one.
    fn emit_status(&mut self, text: &str) -> CycleFlow {
        let changed = self.state.last_status.as_deref() != Some(text);
        self.state.last_status = Some(text.to_string());
        self.state.last_emitted_changed = changed;
        self.emit(MonitorEvent::status(text, changed))
    }

    /// Hand an event to the presentation layer. The channel is bounded;
    /// when the consumer lags the event is dropped rather than blocking
    /// the worker. A closed channel means the presentation layer is
    /// gone, which is treated as a stop request.
    fn emit(&self, event: MonitorEvent) -> CycleFlow {
        use mpsc::error::TrySendError;
        match self.events.try_send(event) {
            Ok(()) => CycleFlow::Continue,
            Err(TrySendError::Full(event)) => {
                warn!("Event queue full, dropping {:?}", event);
                CycleFlow::Continue
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event channel closed, shutting down worker");
                CycleFlow::Shutdown
            }
        }
    }
}

/// Best-effort description of a panic payload.
fn panic_description(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Probe scripted with a fixed answer set.
    struct FixedProbe {
        visible: bool,
        associated: bool,
        internet: bool,
    }

    impl NetworkProbe for FixedProbe {
        fn is_network_visible(&self, _ssid: &str) -> bool {
            self.visible
        }

        fn current_association(&self, _ssid: &str) -> bool {
            self.associated
        }

        fn has_internet(&self) -> bool {
            self.internet
        }
    }

    /// Installer with a fixed acknowledgment answer.
    struct FixedInstaller {
        accept: bool,
        installs: Mutex<u32>,
    }

    impl ProfileInstaller for FixedInstaller {
        fn install(&self, _target: &NetworkTarget) -> bool {
            *self.installs.lock().unwrap() += 1;
            self.accept
        }
    }

    fn fast_config() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.poll_interval_secs = 0;
        config.settle_delay_secs = 0;
        config.reconnect_delay_secs = 0;
        config.reconnect_attempts = 2;
        config.recovery_delay_secs = 0;
        config
    }

    fn worker(
        config: MonitorConfig,
        probe: FixedProbe,
        installer: FixedInstaller,
    ) -> (MonitorWorker, Receiver<MonitorEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let target = NetworkTarget::new("HomeNet", "hunter2hunter2").unwrap();
        let worker = MonitorWorker::new(
            config,
            target,
            Box::new(probe),
            Box::new(installer),
            tx,
            Arc::new(AtomicBool::new(false)),
        );
        (worker, rx)
    }

    fn statuses(rx: &mut Receiver<MonitorEvent>) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let MonitorEvent::Status { text, new_entry, .. } = event {
                out.push((text, new_entry));
            }
        }
        out
    }

    fn connectivity(rx: &mut Receiver<MonitorEvent>) -> Vec<bool> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let MonitorEvent::Connectivity { connected } = event {
                out.push(connected);
            }
        }
        out
    }

    #[test]
    fn test_not_visible_status() {
        let probe = FixedProbe {
            visible: false,
            associated: false,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let (mut worker, mut rx) = worker(fast_config(), probe, installer);

        assert_eq!(worker.cycle(), CycleFlow::Continue);

        let seen = statuses(&mut rx);
        assert_eq!(seen, vec![("network not found".to_string(), true)]);
    }

    #[test]
    fn test_repeated_status_is_not_a_new_entry() {
        let probe = FixedProbe {
            visible: true,
            associated: true,
            internet: true,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let (mut worker, mut rx) = worker(fast_config(), probe, installer);

        worker.cycle();
        worker.cycle();

        let seen = statuses(&mut rx);
        assert_eq!(
            seen,
            vec![
                ("connected, internet available".to_string(), true),
                ("connected, internet available".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_connected_without_internet() {
        let probe = FixedProbe {
            visible: true,
            associated: true,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let (mut worker, mut rx) = worker(fast_config(), probe, installer);

        worker.cycle();

        let mut connected = Vec::new();
        let mut texts = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                MonitorEvent::Status { text, .. } => texts.push(text),
                MonitorEvent::Connectivity { connected: c } => connected.push(c),
            }
        }
        assert_eq!(texts, vec!["connected, no internet".to_string()]);
        assert_eq!(connected, vec![true]);
    }

    #[test]
    fn test_unassociated_triggers_reconnect() {
        let probe = FixedProbe {
            visible: true,
            associated: false,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let (mut worker, mut rx) = worker(fast_config(), probe, installer);

        worker.cycle();

        let seen = statuses(&mut rx);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("network found, connecting...".to_string(), true));
        // Association never establishes, so the two-attempt budget runs
        // out and its message becomes the cycle status.
        assert_eq!(seen[1], ("failed after 2 attempts".to_string(), true));
    }

    #[test]
    fn test_reconnect_rejection_reported() {
        let probe = FixedProbe {
            visible: true,
            associated: false,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: false,
            installs: Mutex::new(0),
        };
        let (mut worker, mut rx) = worker(fast_config(), probe, installer);

        worker.cycle();
        let all = statuses(&mut rx);
        assert_eq!(
            all.last().unwrap().0,
            "attempt 1/2: connect command failed"
        );
    }

    #[test]
    fn test_connectivity_signal_per_cycle() {
        let probe = FixedProbe {
            visible: false,
            associated: false,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let (mut worker, mut rx) = worker(fast_config(), probe, installer);

        worker.cycle();
        worker.cycle();
        assert_eq!(connectivity(&mut rx), vec![false, false]);
    }

    #[test]
    fn test_maintenance_fires_on_its_own_interval() {
        let probe = FixedProbe {
            visible: true,
            associated: true,
            internet: true,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let mut config = fast_config();
        config.maintenance_interval_secs = 1;
        let (mut worker, mut rx) = worker(config, probe, installer);

        worker.cycle();
        let before: Vec<_> = statuses(&mut rx)
            .into_iter()
            .filter(|(text, _)| text == MAINTENANCE_STATUS)
            .collect();
        assert!(before.is_empty());

        // Force the wall-clock interval to elapse.
        worker.last_maintenance = Instant::now() - Duration::from_secs(2);
        worker.cycle();
        let after: Vec<_> = statuses(&mut rx)
            .into_iter()
            .filter(|(text, _)| text == MAINTENANCE_STATUS)
            .collect();
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn test_worker_stops_on_request() {
        let probe = FixedProbe {
            visible: false,
            associated: false,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let target = NetworkTarget::new("HomeNet", "hunter2hunter2").unwrap();
        let service = MonitorService::new(fast_config(), target);
        let (mut handle, mut rx) = service.spawn_with(Box::new(probe), Box::new(installer));

        // Let a few cycles run, then stop and join.
        std::thread::sleep(Duration::from_millis(50));
        handle.stop();
        assert!(handle.is_finished());
        assert!(!statuses(&mut rx).is_empty());
    }

    #[test]
    fn test_closed_channel_shuts_worker_down() {
        let probe = FixedProbe {
            visible: false,
            associated: false,
            internet: false,
        };
        let installer = FixedInstaller {
            accept: true,
            installs: Mutex::new(0),
        };
        let (mut worker, rx) = worker(fast_config(), probe, installer);
        drop(rx);
        assert_eq!(worker.cycle(), CycleFlow::Shutdown);
    }
}
