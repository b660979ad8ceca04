// Wi-Fi Monitor - Network Probe
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Read-only queries against the OS network stack.
//!
//! Three questions are answered per cycle: is the target network visible,
//! is the host associated with it, and is the internet reachable. Every
//! OS-facing call swallows its errors and degrades to the most
//! conservative boolean; a single erroring probe must never halt
//! monitoring. Output parsing lives in free functions so fixture strings
//! can drive it in tests.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

use crate::models::MonitorConfig;
use crate::nmcli::{CommandRunner, NmcliRunner};

/// Leading state word of an nmcli STATE field, e.g. "connecting" out of
/// "connecting (configuring)".
static STATE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z-]+").expect("state pattern"));

/// STATE values that count as an active association. nmcli also reports
/// transitional ("connecting") and inactive ("disconnected",
/// "unavailable") states; only these labels mean the link is up. The
/// labels are tool-specific, so they live in one table rather than
/// inline comparisons.
const ACTIVE_STATES: &[&str] = &["connected"];

/// Probe interface for the monitor core. Implementations must answer
/// without raising; absence and failure are indistinguishable to the
/// caller, whose only action in both cases is "not yet".
pub trait NetworkProbe: Send {
    /// Whether a network with the given name is currently in range.
    fn is_network_visible(&self, ssid: &str) -> bool;

    /// Whether the host is actively associated with the given network.
    fn current_association(&self, ssid: &str) -> bool;

    /// Whether a transport-level connection to the internet can be
    /// established.
    fn has_internet(&self) -> bool;
}

/// Connectivity probe endpoints: the local gateway first, a public
/// fallback second.
#[derive(Debug, Clone)]
pub struct ConnectivityEndpoints {
    pub primary_host: String,
    pub primary_port: u16,
    pub fallback_host: String,
    pub fallback_port: u16,
    pub timeout: Duration,
}

impl ConnectivityEndpoints {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            primary_host: config.gateway_host.clone(),
            primary_port: config.gateway_port,
            fallback_host: config.fallback_host.clone(),
            fallback_port: config.fallback_port,
            timeout: config.probe_timeout(),
        }
    }
}

/// Probe implementation backed by nmcli and raw TCP connects.
pub struct NmcliProbe {
    runner: Box<dyn CommandRunner>,
    endpoints: ConnectivityEndpoints,
    scan_timeout: Duration,
    status_timeout: Duration,
}

impl NmcliProbe {
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_runner(Box::new(NmcliRunner), config)
    }

    pub fn with_runner(runner: Box<dyn CommandRunner>, config: &MonitorConfig) -> Self {
        Self {
            runner,
            endpoints: ConnectivityEndpoints::from_config(config),
            scan_timeout: config.scan_timeout(),
            status_timeout: config.status_timeout(),
        }
    }
}

impl NetworkProbe for NmcliProbe {
    fn is_network_visible(&self, ssid: &str) -> bool {
        let output = self.runner.run(
            &["-t", "-f", "SSID", "device", "wifi", "list"],
            self.scan_timeout,
        );
        match output {
            Some(out) if out.success => ssid_in_scan(&out.stdout, ssid),
            Some(_) => false,
            None => {
                debug!("Network scan failed, treating \"{}\" as not visible", ssid);
                false
            }
        }
    }

    fn current_association(&self, ssid: &str) -> bool {
        let output = self.runner.run(
            &["-t", "-f", "DEVICE,TYPE,STATE,CONNECTION", "device", "status"],
            self.status_timeout,
        );
        match output {
            Some(out) if out.success => match parse_wifi_link(&out.stdout) {
                Some(link) => link.connection == ssid && state_is_active(&link.state),
                None => false,
            },
            _ => {
                debug!("Interface status query failed, treating as not associated");
                false
            }
        }
    }

    fn has_internet(&self) -> bool {
        let e = &self.endpoints;
        if tcp_reachable(&e.primary_host, e.primary_port, e.timeout) {
            return true;
        }
        debug!(
            "Gateway {}:{} unreachable, trying fallback",
            e.primary_host, e.primary_port
        );
        tcp_reachable(&e.fallback_host, e.fallback_port, e.timeout)
    }
}

/// Attempt a raw TCP connection; no application data is sent.
pub fn tcp_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!("Failed to resolve {}:{}: {}", host, port, e);
            return false;
        }
    };
    for addr in addrs {
        if TcpStream::connect_timeout(&addr, timeout).is_ok() {
            return true;
        }
    }
    false
}

/// The wifi row of an `nmcli device status` dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiLink {
    pub connection: String,
    pub state: String,
}

/// Extract the first wifi row from terse `device status` output.
pub fn parse_wifi_link(output: &str) -> Option<WifiLink> {
    for line in output.lines() {
        let fields = split_terse_line(line);
        if fields.len() < 4 {
            continue;
        }
        if fields[1] == "wifi" {
            return Some(WifiLink {
                state: fields[2].clone(),
                connection: fields[3].clone(),
            });
        }
    }
    None
}

/// Whether a STATE field indicates an active (not transitional, not
/// torn-down) association.
pub fn state_is_active(state: &str) -> bool {
    match STATE_WORD.find(state.trim()) {
        Some(word) => ACTIVE_STATES.contains(&word.as_str()),
        None => false,
    }
}

/// Whether an SSID appears in terse scan output (one SSID per line).
pub fn ssid_in_scan(output: &str, ssid: &str) -> bool {
    output
        .lines()
        .any(|line| !line.is_empty() && unescape_terse(line) == ssid)
}

/// Split one terse-mode line on unescaped colons, unescaping each field.
fn split_terse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Resolve nmcli terse-mode backslash escapes in a single field.
fn unescape_terse(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
