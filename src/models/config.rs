// Wi-Fi Monitor - Application Configuration
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Application configuration model.
//!
//! All timing constants and probe endpoints live here and are passed into
//! the monitor and reconnect policy at construction. There is no
//! process-wide mutable configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Poll interval between monitor cycles, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum reconnect attempts per reconnection effort.
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Delay between reconnect attempts, in seconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,

    /// Settle delay after a connect request, before checking whether
    /// association took effect, in seconds.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    /// Interval between maintenance-check status emissions, in seconds.
    /// Tracked against wall clock, independently of the poll cadence.
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval_secs: u64,

    /// Recovery delay after a failed monitor cycle, in seconds.
    #[serde(default = "default_recovery_delay")]
    pub recovery_delay_secs: u64,

    /// Primary connectivity probe host (the local gateway).
    #[serde(default = "default_gateway_host")]
    pub gateway_host: String,

    /// Primary connectivity probe port.
    #[serde(default = "default_gateway_port")]
    pub gateway_port: u16,

    /// Fallback connectivity probe host.
    #[serde(default = "default_fallback_host")]
    pub fallback_host: String,

    /// Fallback connectivity probe port.
    #[serde(default = "default_fallback_port")]
    pub fallback_port: u16,

    /// Timeout for each raw connectivity probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Timeout for network scan commands, in seconds.
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,

    /// Timeout for interface status commands, in seconds.
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    /// How long nmcli waits for an association request, in seconds.
    #[serde(default = "default_connect_wait")]
    pub connect_wait_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_secs: default_reconnect_delay(),
            settle_delay_secs: default_settle_delay(),
            maintenance_interval_secs: default_maintenance_interval(),
            recovery_delay_secs: default_recovery_delay(),
            gateway_host: default_gateway_host(),
            gateway_port: default_gateway_port(),
            fallback_host: default_fallback_host(),
            fallback_port: default_fallback_port(),
            probe_timeout_secs: default_probe_timeout(),
            scan_timeout_secs: default_scan_timeout(),
            status_timeout_secs: default_status_timeout(),
            connect_wait_secs: default_connect_wait(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1
}

fn default_reconnect_attempts() -> u32 {
    100
}

fn default_reconnect_delay() -> u64 {
    2
}

fn default_settle_delay() -> u64 {
    3
}

fn default_maintenance_interval() -> u64 {
    300
}

fn default_recovery_delay() -> u64 {
    5
}

fn default_gateway_host() -> String {
    "192.168.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    80
}

fn default_fallback_host() -> String {
    "8.8.8.8".to_string()
}

fn default_fallback_port() -> u16 {
    53
}

fn default_probe_timeout() -> u64 {
    2
}

fn default_scan_timeout() -> u64 {
    5
}

fn default_status_timeout() -> u64 {
    3
}

fn default_connect_wait() -> u64 {
    15
}

impl MonitorConfig {
    /// Load configuration from TOML file.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, super::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file with restrictive permissions (0600).
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), super::Error> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }

    pub fn recovery_delay(&self) -> Duration {
        Duration::from_secs(self.recovery_delay_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn connect_wait(&self) -> Duration {
        Duration::from_secs(self.connect_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.reconnect_attempts, 100);
        assert_eq!(config.reconnect_delay_secs, 2);
        assert_eq!(config.maintenance_interval_secs, 300);
        assert_eq!(config.gateway_port, 80);
        assert_eq!(config.fallback_host, "8.8.8.8");
        assert_eq!(config.fallback_port, 53);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: MonitorConfig =
            toml::from_str("gateway_host = \"10.0.0.1\"\nreconnect_attempts = 5\n").unwrap();
        assert_eq!(config.gateway_host, "10.0.0.1");
        assert_eq!(config.reconnect_attempts, 5);
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.settle_delay_secs, 3);
    }

    #[test]
    fn test_roundtrip() {
        let config = MonitorConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: MonitorConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.reconnect_attempts, config.reconnect_attempts);
        assert_eq!(parsed.gateway_host, config.gateway_host);
    }
}
