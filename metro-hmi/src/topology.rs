/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Railway line topology: which slice of a controller's flat register/coil
//! arrays belongs to which line.
//!
//! Each line owns four half-open index ranges:
//!
//! ```text
//!              junction source (PLC-00)          station source (PLC-03)
//!             registers        coils            registers        coils
//! weline      [0, 17)          [0, 8)           [0, 10)          [0, 10)
//! nsline      [17, 25)         [8, 12)          [10, 16)         [10, 16)
//! ccline      [25, 39)         [12, 19)         [16, 22)         [16, 22)
//! ```
//!
//! The table is validated once in [`LineTopology::new`] and is immutable
//! afterwards.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::ConfigError;

// ── Line identity ─────────────────────────────────────────────────────────────

/// One of the three metro lines shown on the HMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineId {
    /// East-west line.
    Weline,
    /// North-south line.
    Nsline,
    /// Circle line.
    Ccline,
}

impl LineId {
    /// All lines in display order.
    pub const ALL: [LineId; 3] = [LineId::Weline, LineId::Nsline, LineId::Ccline];

    pub fn as_str(self) -> &'static str {
        match self {
            LineId::Weline => "weline",
            LineId::Nsline => "nsline",
            LineId::Ccline => "ccline",
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownLine(s.to_string()))
    }
}

// ── Reading categories ────────────────────────────────────────────────────────

/// Which controller array a category is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArrayKind {
    /// Word-sized holding registers (sensor state).
    Registers,
    /// Single-bit coils (signal state).
    Coils,
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKind::Registers => f.write_str("holding registers"),
            ArrayKind::Coils => f.write_str("coils"),
        }
    }
}

/// The four per-line reading categories published every refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadingCategory {
    /// Junction track sensors.
    Sensor,
    /// Junction signals.
    Signal,
    /// Station platform sensors.
    StationSensor,
    /// Station platform signals.
    StationSignal,
}

impl ReadingCategory {
    /// Emission order within one line.
    pub const ALL: [ReadingCategory; 4] = [
        ReadingCategory::Sensor,
        ReadingCategory::Signal,
        ReadingCategory::StationSensor,
        ReadingCategory::StationSignal,
    ];

    /// Sensors live in holding registers, signals in coils.
    pub fn array_kind(self) -> ArrayKind {
        match self {
            ReadingCategory::Sensor | ReadingCategory::StationSensor => ArrayKind::Registers,
            ReadingCategory::Signal | ReadingCategory::StationSignal => ArrayKind::Coils,
        }
    }

    pub fn is_station(self) -> bool {
        matches!(
            self,
            ReadingCategory::StationSensor | ReadingCategory::StationSignal
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingCategory::Sensor => "sensor",
            ReadingCategory::Signal => "signal",
            ReadingCategory::StationSensor => "station_sensor",
            ReadingCategory::StationSignal => "station_signal",
        }
    }
}

impl fmt::Display for ReadingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Index ranges ──────────────────────────────────────────────────────────────

/// Half-open index interval `[start, end)` into a controller's flat array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `start ≤ end`.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Number of indices covered; zero for malformed ranges.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Two ranges overlap when they share at least one index.  Empty ranges
    /// never overlap anything.
    pub fn overlaps(&self, other: &IndexRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }

    pub(crate) fn check(&self, owner: &str, field: &'static str) -> Result<(), ConfigError> {
        if self.is_well_formed() {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                owner: owner.to_string(),
                field,
                start: self.start,
                end: self.end,
            })
        }
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ── Display metadata ──────────────────────────────────────────────────────────

/// Line colour used for map overlays and I/O labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

// ── LineConfig ────────────────────────────────────────────────────────────────

/// Index mappings and display metadata for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    pub id: LineId,

    /// Junction sensors, in the junction source's holding registers.
    pub sensor_range: IndexRange,
    /// Junction signals, in the junction source's coils.
    pub signal_range: IndexRange,
    /// Station sensors, in the station source's holding registers.
    pub station_sensor_range: IndexRange,
    /// Station signals, in the station source's coils.
    pub station_signal_range: IndexRange,

    /// Controller whose arrays hold this line's junction data.
    pub junction_source: String,
    /// Controller whose arrays hold this line's station data.
    pub station_source: String,

    pub color: Rgb,
    pub icon: String,
}

impl LineConfig {
    /// The configured range for `category`.
    pub fn range(&self, category: ReadingCategory) -> IndexRange {
        match category {
            ReadingCategory::Sensor => self.sensor_range,
            ReadingCategory::Signal => self.signal_range,
            ReadingCategory::StationSensor => self.station_sensor_range,
            ReadingCategory::StationSignal => self.station_signal_range,
        }
    }

    /// The controller `category` is read from.
    pub fn source(&self, category: ReadingCategory) -> &str {
        if category.is_station() {
            &self.station_source
        } else {
            &self.junction_source
        }
    }

    fn check_ranges(&self) -> Result<(), ConfigError> {
        let owner = self.id.as_str();
        self.sensor_range.check(owner, "sensor")?;
        self.signal_range.check(owner, "signal")?;
        self.station_sensor_range.check(owner, "station sensor")?;
        self.station_signal_range.check(owner, "station signal")?;
        Ok(())
    }
}

// ── LineTopology ──────────────────────────────────────────────────────────────

/// Validated, read-only table of the three lines.
#[derive(Debug, Clone)]
pub struct LineTopology {
    /// Always sorted in [`LineId::ALL`] order, one entry per line.
    lines: Vec<LineConfig>,
}

impl LineTopology {
    /// Builds the topology from `lines` (any order).
    ///
    /// # Errors
    /// * [`ConfigError::DuplicateLine`] / [`ConfigError::MissingLine`] unless
    ///   every line appears exactly once.
    /// * [`ConfigError::InvalidRange`] for any range with `start > end`.
    /// * [`ConfigError::OverlappingRanges`] when two lines map overlapping
    ///   ranges onto the same controller array.
    pub fn new(mut lines: Vec<LineConfig>) -> Result<Self, ConfigError> {
        lines.sort_by_key(|l| l.id);
        for pair in lines.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(ConfigError::DuplicateLine(pair[0].id));
            }
        }
        for id in LineId::ALL {
            if !lines.iter().any(|l| l.id == id) {
                return Err(ConfigError::MissingLine(id));
            }
        }
        for line in &lines {
            line.check_ranges()?;
        }

        let topology = Self { lines };
        topology.check_disjoint()?;
        Ok(topology)
    }

    /// The reference topology documented in the module header.
    pub fn reference() -> Self {
        let line = |id, sensor, signal, station_sensor, station_signal, color, icon: &str| {
            LineConfig {
                id,
                sensor_range: sensor,
                signal_range: signal,
                station_sensor_range: station_sensor,
                station_signal_range: station_signal,
                junction_source: String::from("PLC-00"),
                station_source: String::from("PLC-03"),
                color,
                icon: icon.to_string(),
            }
        };

        Self {
            lines: vec![
                line(
                    LineId::Weline,
                    IndexRange::new(0, 17),
                    IndexRange::new(0, 8),
                    IndexRange::new(0, 10),
                    IndexRange::new(0, 10),
                    Rgb(52, 169, 129),
                    "welabel.png",
                ),
                line(
                    LineId::Nsline,
                    IndexRange::new(17, 25),
                    IndexRange::new(8, 12),
                    IndexRange::new(10, 16),
                    IndexRange::new(10, 16),
                    Rgb(233, 0, 97),
                    "nslabel.png",
                ),
                line(
                    LineId::Ccline,
                    IndexRange::new(25, 39),
                    IndexRange::new(12, 19),
                    IndexRange::new(16, 22),
                    IndexRange::new(16, 22),
                    Rgb(255, 136, 0),
                    "cclabel.png",
                ),
            ],
        }
    }

    /// Looks a line up by its textual id.
    ///
    /// # Errors
    /// [`ConfigError::UnknownLine`] if `id` is not `weline`, `nsline` or
    /// `ccline`.
    pub fn get(&self, id: &str) -> Result<&LineConfig, ConfigError> {
        let id: LineId = id.parse()?;
        Ok(self.line(id))
    }

    /// Every line is present after validation, so lookup by [`LineId`] cannot
    /// fail.
    pub fn line(&self, id: LineId) -> &LineConfig {
        let pos = LineId::ALL
            .iter()
            .position(|&l| l == id)
            .unwrap_or_default();
        &self.lines[pos]
    }

    /// Lines in [`LineId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &LineConfig> {
        self.lines.iter()
    }

    /// Lines whose `category` data is held by `controller`.
    pub fn sourced_from<'a>(
        &'a self,
        controller: &'a str,
        category: ReadingCategory,
    ) -> impl Iterator<Item = &'a LineConfig> + 'a {
        self.lines
            .iter()
            .filter(move |l| l.source(category) == controller)
    }

    /// Ranges on the same (controller, array) must be pairwise disjoint
    /// across lines.
    fn check_disjoint(&self) -> Result<(), ConfigError> {
        for (i, a) in self.lines.iter().enumerate() {
            for b in &self.lines[i + 1..] {
                for ca in ReadingCategory::ALL {
                    for cb in ReadingCategory::ALL {
                        if ca.array_kind() != cb.array_kind() || a.source(ca) != b.source(cb) {
                            continue;
                        }
                        let (ra, rb) = (a.range(ca), b.range(cb));
                        if ra.overlaps(&rb) {
                            return Err(ConfigError::OverlappingRanges {
                                first: a.id,
                                second: b.id,
                                controller: a.source(ca).to_string(),
                                array: ca.array_kind(),
                                first_start: ra.start,
                                first_end: ra.end,
                                second_start: rb.start,
                                second_end: rb.end,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
