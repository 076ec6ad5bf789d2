/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! One refresh cycle: raw snapshots in, named readings out.
//!
//! [`StateProjector::refresh`] walks the registry in declaration order.  For
//! every controller it
//!
//! 1. resolves the controller's source: connectivity and, if connected, a
//!    [`RawSnapshot`] covering everything any window or line reads from it
//!    (fetched at most once per cycle),
//! 2. records the state in the [`ConnectivityTracker`] and publishes the
//!    connection indicator,
//! 3. publishes the controller's own panel windows,
//! 4. if the controller is itself a source, publishes every line reading
//!    sourced from it.
//!
//! A disconnected source never yields stale values: every reading that
//! depends on it is published as [`Payload::Unavailable`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::HmiConfig;
use crate::connectivity::ConnectivityTracker;
use crate::display::{DisplaySink, LineReading, PanelReading, Payload};
use crate::extract::{extract_range, is_truncated};
use crate::registry::ControllerInfo;
use crate::source::{DataSource, RawSnapshot};
use crate::topology::{ArrayKind, IndexRange, ReadingCategory};

/// How far into a source's address space a snapshot must reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SourceExtent {
    registers: usize,
    coils: usize,
}

/// Summary of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub started_at: Instant,
    pub controllers: usize,
    pub connected: usize,
    pub panel_readings: usize,
    pub line_readings: usize,
    /// Readings that got fewer values than their range asked for.
    pub truncated: usize,
}

impl CycleReport {
    fn new(started_at: Instant) -> Self {
        Self {
            started_at,
            controllers: 0,
            connected: 0,
            panel_readings: 0,
            line_readings: 0,
            truncated: 0,
        }
    }
}

pub struct StateProjector {
    config: Arc<HmiConfig>,
    /// source id → snapshot extent.
    extents: BTreeMap<String, SourceExtent>,
}

impl StateProjector {
    pub fn new(config: Arc<HmiConfig>) -> Self {
        let extents = Self::build_extents(&config);
        for (source, extent) in &extents {
            debug!(
                source    = %source,
                registers = extent.registers,
                coils     = extent.coils,
                "snapshot extent"
            );
        }
        Self { config, extents }
    }

    /// Runs one refresh cycle started at `now`.
    pub fn refresh<S, D>(
        &self,
        source: &mut S,
        tracker: &mut ConnectivityTracker,
        sink: &mut D,
        now: Instant,
    ) -> CycleReport
    where
        S: DataSource + ?Sized,
        D: DisplaySink + ?Sized,
    {
        let mut report = CycleReport::new(now);
        // Lives for this cycle only; `None` marks a disconnected source.
        let mut snapshots: BTreeMap<&str, Option<RawSnapshot>> = BTreeMap::new();

        for controller in self.config.registry.list() {
            report.controllers += 1;

            let source_id = controller.source.as_str();
            let snapshot = snapshots
                .entry(source_id)
                .or_insert_with(|| self.fetch_source(source, source_id, now))
                .as_ref();
            let connected = snapshot.is_some();

            if tracker.update(&controller.id, connected, now) {
                if connected {
                    info!(controller = %controller.id, source = %source_id, "controller connected");
                } else {
                    warn!(controller = %controller.id, source = %source_id, "controller disconnected");
                }
            }
            sink.on_connection_update(&controller.id, connected);
            if connected {
                report.connected += 1;
            }

            sink.on_panel_reading(Self::panel_reading(controller, snapshot, &mut report));
            report.panel_readings += 1;

            if controller.is_source() {
                self.publish_lines(&controller.id, snapshot, sink, &mut report);
            }
        }

        // Sources that no registered controller heads cannot be visited.
        for line in self.config.topology.iter() {
            for category in ReadingCategory::ALL {
                let id = line.source(category);
                if !snapshots.contains_key(id) {
                    error!(
                        line = %line.id,
                        category = %category,
                        error = %crate::config::ConfigError::UnknownController(id.to_string()),
                        "line reading skipped"
                    );
                }
            }
        }

        info!(
            controllers = report.controllers,
            connected = report.connected,
            line_readings = report.line_readings,
            truncated = report.truncated,
            "refresh cycle complete"
        );
        report
    }

    // ── Snapshot acquisition ──────────────────────────────────────────────────

    fn fetch_source<S: DataSource + ?Sized>(
        &self,
        source: &mut S,
        source_id: &str,
        now: Instant,
    ) -> Option<RawSnapshot> {
        if !source.is_connected(source_id) {
            debug!(source = %source_id, "source unavailable, no snapshot this cycle");
            return None;
        }
        let extent = self.extents.get(source_id).copied().unwrap_or_default();
        let snapshot = RawSnapshot::fetch(source, source_id, extent.registers, extent.coils, now);
        debug!(
            source    = %source_id,
            registers = snapshot.registers.len(),
            coils     = snapshot.coils.len(),
            "snapshot fetched"
        );
        Some(snapshot)
    }

    // ── Projection ────────────────────────────────────────────────────────────

    fn panel_reading(
        controller: &ControllerInfo,
        snapshot: Option<&RawSnapshot>,
        report: &mut CycleReport,
    ) -> PanelReading {
        let (registers, coils) = match snapshot {
            Some(s) => (
                Self::slice(s, ArrayKind::Registers, controller.register_window, report),
                Self::slice(s, ArrayKind::Coils, controller.coil_window, report),
            ),
            None => (Payload::Unavailable, Payload::Unavailable),
        };
        PanelReading {
            controller_id: controller.id.clone(),
            registers,
            coils,
        }
    }

    fn publish_lines<D: DisplaySink + ?Sized>(
        &self,
        source_id: &str,
        snapshot: Option<&RawSnapshot>,
        sink: &mut D,
        report: &mut CycleReport,
    ) {
        for category in ReadingCategory::ALL {
            for line in self.config.topology.sourced_from(source_id, category) {
                let payload = match snapshot {
                    Some(s) => Self::slice(s, category.array_kind(), line.range(category), report),
                    None => Payload::Unavailable,
                };
                debug!(
                    line     = %line.id,
                    category = %category,
                    values   = payload.len(),
                    available = payload.is_available(),
                    "line reading"
                );
                sink.on_line_reading(LineReading {
                    line: line.id,
                    category,
                    payload,
                });
                report.line_readings += 1;
            }
        }
    }

    fn slice(
        snapshot: &RawSnapshot,
        kind: ArrayKind,
        range: IndexRange,
        report: &mut CycleReport,
    ) -> Payload {
        let (payload, truncated) = match kind {
            ArrayKind::Registers => (
                Payload::Words(extract_range(&snapshot.registers, range).to_vec()),
                is_truncated(&snapshot.registers, range),
            ),
            ArrayKind::Coils => (
                Payload::Bits(extract_range(&snapshot.coils, range).to_vec()),
                is_truncated(&snapshot.coils, range),
            ),
        };
        if truncated {
            report.truncated += 1;
            debug!(
                source   = %snapshot.controller_id,
                array    = %kind,
                range    = %range,
                received = payload.len(),
                "partial snapshot, reading truncated"
            );
        }
        payload
    }

    // ── Setup ─────────────────────────────────────────────────────────────────

    /// Largest window or line range end per (source, array).
    fn build_extents(config: &HmiConfig) -> BTreeMap<String, SourceExtent> {
        let mut extents: BTreeMap<String, SourceExtent> = BTreeMap::new();

        for c in config.registry.list() {
            let e = extents.entry(c.source.clone()).or_default();
            e.registers = e.registers.max(c.register_window.end);
            e.coils = e.coils.max(c.coil_window.end);
        }
        for line in config.topology.iter() {
            for category in ReadingCategory::ALL {
                let e = extents.entry(line.source(category).to_string()).or_default();
                let end = line.range(category).end;
                match category.array_kind() {
                    ArrayKind::Registers => e.registers = e.registers.max(end),
                    ArrayKind::Coils => e.coils = e.coils.max(end),
                }
            }
        }
        extents
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
