// Wi-Fi Monitor - Network Target
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! The wireless network a monitoring session is bound to.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{Error, Result};

/// Maximum SSID length in bytes (IEEE 802.11).
const MAX_SSID_BYTES: usize = 32;

/// WPA2-PSK passphrase length bounds.
const MIN_PASSPHRASE_CHARS: usize = 8;
const MAX_PASSPHRASE_CHARS: usize = 63;

/// The network name and passphrase a monitoring session watches.
///
/// Immutable for the lifetime of a session; validated once at
/// construction. The passphrase is wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct NetworkTarget {
    ssid: String,
    passphrase: String,
}

impl NetworkTarget {
    /// Create a validated network target.
    pub fn new(ssid: impl Into<String>, passphrase: impl Into<String>) -> Result<Self> {
        let ssid = ssid.into();
        let passphrase = passphrase.into();

        if ssid.is_empty() {
            return Err(Error::invalid_target("network name must not be empty"));
        }
        if ssid.len() > MAX_SSID_BYTES {
            return Err(Error::invalid_target(format!(
                "network name exceeds {} bytes",
                MAX_SSID_BYTES
            )));
        }
        if passphrase.is_empty() {
            return Err(Error::invalid_target("passphrase must not be empty"));
        }
        let chars = passphrase.chars().count();
        if !(MIN_PASSPHRASE_CHARS..=MAX_PASSPHRASE_CHARS).contains(&chars) {
            return Err(Error::invalid_target(format!(
                "WPA2 passphrase must be {}-{} characters",
                MIN_PASSPHRASE_CHARS, MAX_PASSPHRASE_CHARS
            )));
        }

        Ok(Self { ssid, passphrase })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

// Manual Debug: the passphrase must never reach logs.
impl fmt::Debug for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkTarget")
            .field("ssid", &self.ssid)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_target() {
        let target = NetworkTarget::new("HomeNet", "hunter2hunter2").unwrap();
        assert_eq!(target.ssid(), "HomeNet");
        assert_eq!(target.passphrase(), "hunter2hunter2");
    }

    #[test]
    fn test_empty_ssid_rejected() {
        assert!(NetworkTarget::new("", "hunter2hunter2").is_err());
    }

    #[test]
    fn test_overlong_ssid_rejected() {
        let ssid = "x".repeat(33);
        assert!(NetworkTarget::new(ssid, "hunter2hunter2").is_err());
    }

    #[test]
    fn test_short_passphrase_rejected() {
        assert!(NetworkTarget::new("HomeNet", "short").is_err());
        assert!(NetworkTarget::new("HomeNet", "").is_err());
    }

    #[test]
    fn test_debug_redacts_passphrase() {
        let target = NetworkTarget::new("HomeNet", "hunter2hunter2").unwrap();
        let rendered = format!("{:?}", target);
        assert!(rendered.contains("HomeNet"));
        assert!(!rendered.contains("hunter2"));
    }
}
