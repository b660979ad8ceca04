// Wi-Fi Monitor - nmcli Invocation
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Bounded execution of the NetworkManager command-line tool.
//!
//! Every OS-facing call in this crate goes through [`CommandRunner`], so
//! probe and installer logic can be exercised in tests with stub runners,
//! and so a hung tool never stalls a monitor cycle: the child is killed
//! once its per-call timeout elapses.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often a running child is polled for completion.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Captured result of one CLI invocation.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
}

/// Executes the network-management CLI.
///
/// Implementations return `None` when the command could not be spawned
/// or exceeded its timeout; callers treat that the same as a failed
/// command.
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[&str], timeout: Duration) -> Option<CmdOutput>;
}

/// Runs the real `nmcli` binary.
pub struct NmcliRunner;

impl CommandRunner for NmcliRunner {
    fn run(&self, args: &[&str], timeout: Duration) -> Option<CmdOutput> {
        let child = Command::new("nmcli")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("Failed to spawn nmcli {:?}: {}", args, e);
                return None;
            }
        };

        match wait_with_timeout(&mut child, timeout) {
            Some(success) => {
                let mut stdout = String::new();
                if let Some(mut pipe) = child.stdout.take() {
                    let _ = pipe.read_to_string(&mut stdout);
                }
                Some(CmdOutput { success, stdout })
            }
            None => {
                warn!("nmcli {:?} exceeded {:?}, killing", args, timeout);
                let _ = child.kill();
                let _ = child.wait();
                None
            }
        }
    }
}

/// Poll the child until it exits or the deadline passes.
/// Returns `Some(success)` on exit, `None` on timeout or wait error.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status.success()),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(e) => {
                debug!("Failed to wait for nmcli: {}", e);
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Uses /bin/true and /bin/sleep stand-ins via Command directly; the
    // NmcliRunner itself is exercised against a fake binary path only
    // when nmcli is absent, which must degrade to None rather than panic.
    #[test]
    fn test_missing_binary_degrades_to_none() {
        let child = Command::new("definitely-not-a-real-tool-7f3a")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn();
        assert!(child.is_err());
    }

    #[test]
    fn test_wait_with_timeout_kills_slow_child() {
        let mut child = Command::new("sleep")
            .arg("5")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn sleep");
        let started = Instant::now();
        let result = wait_with_timeout(&mut child, Duration::from_millis(200));
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
        let _ = child.kill();
        let _ = child.wait();
    }

    #[test]
    fn test_wait_with_timeout_reports_exit() {
        let mut child = Command::new("true")
            .stdin(Stdio::null())
            .spawn()
            .expect("spawn true");
        assert_eq!(
            wait_with_timeout(&mut child, Duration::from_secs(2)),
            Some(true)
        );
    }
}
