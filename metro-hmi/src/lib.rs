/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Metro HMI – periodic telemetry refresh for the railway signalling SCADA
//! emulator.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/       – YAML overrides, refresh timing, ConfigError
//! ├── topology      – per-line index ranges and display metadata
//! ├── registry      – controllers, their trios and owned windows
//! ├── extract       – bounds-tolerant sub-range extraction
//! ├── connectivity  – last-known connection state per controller
//! ├── source        – DataSource seam + simulated source
//! ├── display       – DisplaySink seam + ReadingBoard
//! ├── projector     – one refresh cycle: snapshots → readings
//! ├── scheduler     – throttle + re-entrancy guard
//! └── service       – tokio timer driving the scheduler
//! ```

pub mod config;
pub mod connectivity;
pub mod display;
pub mod extract;
pub mod projector;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod topology;
