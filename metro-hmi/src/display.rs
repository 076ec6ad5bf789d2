/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Display-side seam: what the refresh cycle publishes and to whom.
//!
//! ```text
//! StateProjector ──► DisplaySink ──► panel widgets / map overlays
//!                     on_connection_update(controller, connected)
//!                     on_panel_reading(PanelReading)
//!                     on_line_reading(LineReading)
//! ```
//!
//! [`ReadingBoard`] is the in-process sink: it keeps the latest value of
//! everything published (last-write-wins) for widgets to read on their own
//! redraw tick.

use std::collections::BTreeMap;

use crate::topology::{LineId, ReadingCategory};

// ── Published values ──────────────────────────────────────────────────────────

/// Values for one (line, category) or one controller window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Holding-register values (sensors).
    Words(Vec<u16>),
    /// Coil values (signals).
    Bits(Vec<bool>),
    /// The source controller is disconnected; there is no data this cycle.
    Unavailable,
}

impl Payload {
    pub fn is_available(&self) -> bool {
        !matches!(self, Payload::Unavailable)
    }

    /// Number of values; zero when unavailable.
    pub fn len(&self) -> usize {
        match self {
            Payload::Words(w) => w.len(),
            Payload::Bits(b) => b.len(),
            Payload::Unavailable => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One line's values for one category, recreated every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReading {
    pub line: LineId,
    pub category: ReadingCategory,
    pub payload: Payload,
}

/// One controller's own register and coil windows, for its panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelReading {
    pub controller_id: String,
    pub registers: Payload,
    pub coils: Payload,
}

// ── DisplaySink ───────────────────────────────────────────────────────────────

/// Consumer of refresh-cycle output.
pub trait DisplaySink {
    fn on_connection_update(&mut self, controller: &str, connected: bool);

    fn on_line_reading(&mut self, reading: LineReading);

    fn on_panel_reading(&mut self, reading: PanelReading);
}

// ── ReadingBoard ──────────────────────────────────────────────────────────────

/// Latest published state, keyed by identity only.
#[derive(Debug, Default)]
pub struct ReadingBoard {
    lines: BTreeMap<(LineId, ReadingCategory), Payload>,
    panels: BTreeMap<String, PanelReading>,
    connections: BTreeMap<String, bool>,
}

impl ReadingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self, line: LineId, category: ReadingCategory) -> Option<&Payload> {
        self.lines.get(&(line, category))
    }

    pub fn panel(&self, controller: &str) -> Option<&PanelReading> {
        self.panels.get(controller)
    }

    /// Connection indicator; `false` for a controller never reported.
    pub fn is_connected(&self, controller: &str) -> bool {
        self.connections.get(controller).copied().unwrap_or(false)
    }

    /// Number of (line, category) slots that currently hold data.
    pub fn available_line_count(&self) -> usize {
        self.lines.values().filter(|p| p.is_available()).count()
    }
}

impl DisplaySink for ReadingBoard {
    fn on_connection_update(&mut self, controller: &str, connected: bool) {
        self.connections.insert(controller.to_string(), connected);
    }

    fn on_line_reading(&mut self, reading: LineReading) {
        self.lines
            .insert((reading.line, reading.category), reading.payload);
    }

    fn on_panel_reading(&mut self, reading: PanelReading) {
        self.panels.insert(reading.controller_id.clone(), reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_line_reading_replaces_previous() {
        let mut board = ReadingBoard::new();
        board.on_line_reading(LineReading {
            line: LineId::Weline,
            category: ReadingCategory::Signal,
            payload: Payload::Bits(vec![true, false]),
        });
        board.on_line_reading(LineReading {
            line: LineId::Weline,
            category: ReadingCategory::Signal,
            payload: Payload::Unavailable,
        });
        assert_eq!(
            board.line(LineId::Weline, ReadingCategory::Signal),
            Some(&Payload::Unavailable)
        );
        assert_eq!(board.available_line_count(), 0);
    }

    #[test]
    fn categories_are_kept_apart() {
        let mut board = ReadingBoard::new();
        board.on_line_reading(LineReading {
            line: LineId::Nsline,
            category: ReadingCategory::Sensor,
            payload: Payload::Words(vec![1, 0, 1]),
        });
        assert!(board
            .line(LineId::Nsline, ReadingCategory::StationSensor)
            .is_none());
        assert_eq!(
            board.line(LineId::Nsline, ReadingCategory::Sensor).map(Payload::len),
            Some(3)
        );
    }

    #[test]
    fn unknown_controller_indicator_is_disconnected() {
        let mut board = ReadingBoard::new();
        assert!(!board.is_connected("PLC-04"));
        board.on_connection_update("PLC-04", true);
        assert!(board.is_connected("PLC-04"));
    }

    #[test]
    fn unavailable_payload_is_empty() {
        assert!(Payload::Unavailable.is_empty());
        assert!(!Payload::Unavailable.is_available());
        assert!(Payload::Words(Vec::new()).is_available());
    }
}
