// Wi-Fi Monitor - Shared Models
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # Wi-Fi Monitor Models
//!
//! Shared types used across the monitor core:
//!
//! - **NetworkTarget**: the network name and passphrase a session watches
//! - **MonitorConfig**: timing constants and probe endpoints
//! - **ProbeResult / ReconnectOutcome / MonitorEvent**: per-cycle results
//!   and the event stream to the presentation layer
//! - **Error**: shared error types
//!
//! ## Design Principles
//!
//! 1. **Explicit configuration**: all timing constants travel in a config
//!    struct; no process-wide mutable singletons
//! 2. **Fresh results**: probe results are recomputed every cycle, never
//!    cached across cycles
//! 3. **Credential hygiene**: passphrase material is wiped on drop and
//!    never logged

pub mod config;
pub mod error;
pub mod status;
pub mod target;

// Re-export main types for convenience
pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use status::{MonitorEvent, ProbeResult, ReconnectOutcome};
pub use target::NetworkTarget;

/// Configuration directory name (under XDG_CONFIG_HOME).
pub const CONFIG_DIR_NAME: &str = "wifi-monitor";

/// Configuration file name inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
