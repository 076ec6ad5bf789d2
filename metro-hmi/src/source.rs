/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Data-acquisition seam.
//!
//! The field-protocol client (Modbus polling, reconnects) lives outside this
//! crate.  It is consumed through [`DataSource`]; [`SimulatedSource`] stands
//! in for it when the HMI runs without field hardware.

use std::collections::BTreeSet;
use std::time::Instant;

/// Synchronous, bounded-time access to the latest raw arrays of a source
/// controller.
///
/// Indices are absolute in the controller's address space.  A returned
/// sequence may be shorter than `end - start` while the link is degraded.
pub trait DataSource {
    fn is_connected(&mut self, controller: &str) -> bool;

    fn holding_registers(&mut self, controller: &str, start: usize, end: usize) -> Vec<u16>;

    fn coils(&mut self, controller: &str, start: usize, end: usize) -> Vec<bool>;
}

// ── RawSnapshot ───────────────────────────────────────────────────────────────

/// Raw arrays of one source controller, covering indices `[0, extent)`.
///
/// Owned by a single refresh cycle and dropped when it ends.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub controller_id: String,
    pub registers: Vec<u16>,
    pub coils: Vec<bool>,
    pub fetched_at: Instant,
}

impl RawSnapshot {
    /// Reads registers `[0, register_extent)` and coils `[0, coil_extent)`.
    pub fn fetch<S: DataSource + ?Sized>(
        source: &mut S,
        controller: &str,
        register_extent: usize,
        coil_extent: usize,
        now: Instant,
    ) -> Self {
        Self {
            controller_id: controller.to_string(),
            registers: source.holding_registers(controller, 0, register_extent),
            coils: source.coils(controller, 0, coil_extent),
            fetched_at: now,
        }
    }
}

// ── SimulatedSource ───────────────────────────────────────────────────────────

/// Deterministic stand-in for the field-protocol client.
///
/// Sensors show a train-like pattern that moves one index per register
/// fetch; coils show the matching signal aspect (red behind an occupied
/// block).  Controllers listed as offline report disconnected and return no
/// data.
#[derive(Debug, Default)]
pub struct SimulatedSource {
    offline: BTreeSet<String>,
    step: usize,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offline<I, S>(offline: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            offline: offline.into_iter().map(Into::into).collect(),
            step: 0,
        }
    }

    pub fn set_online(&mut self, controller: &str, online: bool) {
        if online {
            self.offline.remove(controller);
        } else {
            self.offline.insert(controller.to_string());
        }
    }

    fn occupied(&self, index: usize) -> bool {
        (index + self.step) % 5 == 0
    }
}

impl DataSource for SimulatedSource {
    fn is_connected(&mut self, controller: &str) -> bool {
        !self.offline.contains(controller)
    }

    fn holding_registers(&mut self, controller: &str, start: usize, end: usize) -> Vec<u16> {
        if self.offline.contains(controller) {
            return Vec::new();
        }
        self.step = self.step.wrapping_add(1);
        (start..end).map(|i| u16::from(self.occupied(i))).collect()
    }

    fn coils(&mut self, controller: &str, start: usize, end: usize) -> Vec<bool> {
        if self.offline.contains(controller) {
            return Vec::new();
        }
        (start..end).map(|i| !self.occupied(i)).collect()
    }
}
