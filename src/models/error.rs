// Wi-Fi Monitor - Error Types
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Shared error types for the Wi-Fi Monitor application.
//!
//! Probe-level failures never surface here: the probe boundary degrades
//! every OS-command failure to a conservative boolean. These types cover
//! the places where an error is actionable by the caller: target
//! validation, configuration, IO.

use thiserror::Error;

/// Result type alias for Wi-Fi Monitor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Wi-Fi Monitor operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================
    // Target Errors
    // ========================================
    #[error("Invalid network target: {0}")]
    InvalidTarget(String),

    // ========================================
    // Configuration Errors
    // ========================================
    #[error("Failed to parse configuration: {0}")]
    ConfigParseFailed(String),

    #[error("Failed to write configuration: {0}")]
    ConfigWriteFailed(String),

    // ========================================
    // System Errors
    // ========================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new invalid-target error.
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget(reason.into())
    }
}

// Convert from toml parse errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}

// Convert from toml serialize errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigWriteFailed(err.to_string())
    }
}
