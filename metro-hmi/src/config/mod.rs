/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! HMI configuration: line topology, controller registry and refresh timing.
//!
//! The built-in reference tables are used unless a YAML file overrides them.
//! Every section is optional; an absent section keeps its reference default.
//!
//! ```yaml
//! refresh:
//!   tick_ms: 100
//!   min_interval_ms: 500
//! lines:
//!   weline:
//!     sensors: [0, 17]
//!     signals: [0, 8]
//!     station_sensors: [0, 10]
//!     station_signals: [0, 10]
//!     junction_source: "PLC-00"
//!     station_source: "PLC-03"
//!     color: [52, 169, 129]
//!     icon: "welabel.png"
//!   # nsline, ccline ...
//! controllers:
//!   - id: "PLC-00"
//!     port: 502
//!     role: junction
//!     registers: [0, 15]
//!     coils: [0, 7]
//!     inputs:
//!       - { name: "wes00", line: weline }
//! ```
//!
//! The resulting [`HmiConfig`] is immutable and shared by the scheduler and
//! projector.

pub mod error;

pub use error::ConfigError;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::registry::{ControllerInfo, ControllerRegistry, ControllerRole, IoPoint};
use crate::topology::{IndexRange, LineConfig, LineId, LineTopology, Rgb};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default base timer period.
pub const DEFAULT_TICK_MS: u64 = 100;

/// Default minimum interval between two refresh cycles.
pub const DEFAULT_MIN_REFRESH_MS: u64 = 500;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct HmiConfigFile {
    refresh: Option<RefreshEntry>,
    lines: Option<BTreeMap<String, LineEntry>>,
    controllers: Option<Vec<ControllerEntry>>,
}

#[derive(Debug, Deserialize)]
struct RefreshEntry {
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default = "default_min_interval_ms")]
    min_interval_ms: u64,
}

/// Per-line fields.  Sources, colour and icon fall back to the reference
/// table when absent.
#[derive(Debug, Deserialize)]
struct LineEntry {
    sensors: (usize, usize),
    signals: (usize, usize),
    station_sensors: (usize, usize),
    station_signals: (usize, usize),
    junction_source: Option<String>,
    station_source: Option<String>,
    color: Option<Rgb>,
    icon: Option<String>,
}

/// Per-controller fields.  `source` defaults to the controller itself.
#[derive(Debug, Deserialize)]
struct ControllerEntry {
    id: String,
    label: Option<String>,
    #[serde(default = "default_address")]
    address: String,
    #[serde(default = "default_port")]
    port: u16,
    role: ControllerRole,
    source: Option<String>,
    registers: (usize, usize),
    coils: (usize, usize),
    #[serde(default)]
    inputs: Vec<IoPoint>,
    #[serde(default)]
    outputs: Vec<IoPoint>,
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_REFRESH_MS
}

fn default_address() -> String {
    String::from("127.0.0.1")
}

/// Standard Modbus/TCP port.
fn default_port() -> u16 {
    502
}

fn range((start, end): (usize, usize)) -> IndexRange {
    IndexRange::new(start, end)
}

// ── RefreshTiming ─────────────────────────────────────────────────────────────

/// Base timer period and refresh throttle.
///
/// The timer fires every `tick`; a cycle only starts once `min_interval` has
/// elapsed since the previous one, so the effective refresh rate can be
/// tuned without touching the timer wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTiming {
    pub tick: Duration,
    pub min_interval: Duration,
}

impl RefreshTiming {
    /// # Errors
    /// [`ConfigError::InvalidTiming`] unless `0 < tick < min_interval`.
    pub fn new(tick: Duration, min_interval: Duration) -> Result<Self, ConfigError> {
        if tick.is_zero() || tick >= min_interval {
            return Err(ConfigError::InvalidTiming { tick, min_interval });
        }
        Ok(Self { tick, min_interval })
    }

    pub fn from_millis(tick_ms: u64, min_interval_ms: u64) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_millis(tick_ms),
            Duration::from_millis(min_interval_ms),
        )
    }

    /// Replaces whichever of the two values is given, keeping the other, and
    /// validates the result.
    pub fn with_overrides(
        self,
        tick_ms: Option<u64>,
        min_interval_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::new(
            tick_ms.map_or(self.tick, Duration::from_millis),
            min_interval_ms.map_or(self.min_interval, Duration::from_millis),
        )
    }
}

impl Default for RefreshTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            min_interval: Duration::from_millis(DEFAULT_MIN_REFRESH_MS),
        }
    }
}

// ── HmiConfig ─────────────────────────────────────────────────────────────────

/// Validated static configuration handed to the refresh pipeline.
#[derive(Debug, Clone)]
pub struct HmiConfig {
    pub topology: LineTopology,
    pub registry: ControllerRegistry,
    pub timing: RefreshTiming,
}

impl HmiConfig {
    /// Combines independently validated parts and checks that every line's
    /// junction and station sources are registered trio heads.
    pub fn new(
        topology: LineTopology,
        registry: ControllerRegistry,
        timing: RefreshTiming,
    ) -> Result<Self, ConfigError> {
        for line in topology.iter() {
            registry.check_source(line.id.as_str(), &line.junction_source)?;
            registry.check_source(line.id.as_str(), &line.station_source)?;
        }
        Ok(Self {
            topology,
            registry,
            timing,
        })
    }

    /// Reference topology, reference registry and default timing.
    pub fn reference() -> Self {
        Self {
            topology: LineTopology::reference(),
            registry: ControllerRegistry::reference(),
            timing: RefreshTiming::default(),
        }
    }

    /// Replaces the refresh timing.
    pub fn with_timing(mut self, timing: RefreshTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Reads `path` and overlays it on the reference configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid, or the result fails validation (see [`ConfigError`]).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading HMI configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Parses a YAML document and overlays it on the reference configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: HmiConfigFile =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;

        let timing = match file.refresh {
            Some(r) => RefreshTiming::from_millis(r.tick_ms, r.min_interval_ms)?,
            None => RefreshTiming::default(),
        };

        let topology = match file.lines {
            Some(entries) => build_topology(entries)?,
            None => LineTopology::reference(),
        };

        let registry = match file.controllers {
            Some(entries) => build_registry(entries)?,
            None => ControllerRegistry::reference(),
        };

        let config = Self::new(topology, registry, timing)?;

        info!(
            lines = config.topology.iter().count(),
            controllers = config.registry.len(),
            tick = ?config.timing.tick,
            min_interval = ?config.timing.min_interval,
            "HMI configuration loaded"
        );
        Ok(config)
    }
}

fn build_topology(entries: BTreeMap<String, LineEntry>) -> Result<LineTopology, ConfigError> {
    let reference = LineTopology::reference();
    let mut lines = Vec::with_capacity(entries.len());

    for (name, entry) in entries {
        let id: LineId = name.parse()?;
        let fallback = reference.line(id);
        let line = LineConfig {
            id,
            sensor_range: range(entry.sensors),
            signal_range: range(entry.signals),
            station_sensor_range: range(entry.station_sensors),
            station_signal_range: range(entry.station_signals),
            junction_source: entry
                .junction_source
                .unwrap_or_else(|| fallback.junction_source.clone()),
            station_source: entry
                .station_source
                .unwrap_or_else(|| fallback.station_source.clone()),
            color: entry.color.unwrap_or(fallback.color),
            icon: entry.icon.unwrap_or_else(|| fallback.icon.clone()),
        };
        debug!(
            "  Line: {} | sensors {} | signals {} | station sensors {} | station signals {}",
            line.id,
            line.sensor_range,
            line.signal_range,
            line.station_sensor_range,
            line.station_signal_range,
        );
        lines.push(line);
    }

    LineTopology::new(lines)
}

fn build_registry(entries: Vec<ControllerEntry>) -> Result<ControllerRegistry, ConfigError> {
    let controllers = entries
        .into_iter()
        .map(|entry| {
            let info = ControllerInfo {
                label: entry.label.unwrap_or_else(|| entry.id.clone()),
                source: entry.source.unwrap_or_else(|| entry.id.clone()),
                id: entry.id,
                address: entry.address,
                port: entry.port,
                role: entry.role,
                register_window: range(entry.registers),
                coil_window: range(entry.coils),
                inputs: entry.inputs,
                outputs: entry.outputs,
            };
            debug!(
                "  Controller: {} | {} | source {} | registers {} | coils {}",
                info.id,
                info.endpoint(),
                info.source,
                info.register_window,
                info.coil_window,
            );
            info
        })
        .collect();

    ControllerRegistry::new(controllers)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
