// Wi-Fi Monitor - Background Services
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Background services for the monitoring session:
//! - Reconnect: bounded-retry reconnection policy
//! - Monitor: the repeating poll cycle on a background worker

pub mod monitor;
pub mod reconnect;

pub use monitor::{MonitorHandle, MonitorService};
pub use reconnect::ReconnectPolicy;
