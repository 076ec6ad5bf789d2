/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Last-known connection state per controller.
//!
//! Fail-safe: a controller that was never reported is disconnected.

use std::collections::BTreeMap;
use std::time::Instant;

/// Connection state of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    /// Last time the controller was seen connected; `None` if never.
    pub last_seen: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct ConnectivityTracker {
    states: BTreeMap<String, ConnectionState>,
}

impl ConnectivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state reported for `controller` at `now`, replacing the
    /// previous one without debouncing.
    ///
    /// Returns `true` when the connected flag differs from the previous
    /// report.  The first report of a controller is always a change, so a
    /// controller that is down from startup is reported too.
    pub fn update(&mut self, controller: &str, connected: bool, now: Instant) -> bool {
        let previous = self.states.get(controller).copied();
        let last_seen = if connected {
            Some(now)
        } else {
            previous.and_then(|s| s.last_seen)
        };
        self.states.insert(
            controller.to_string(),
            ConnectionState {
                connected,
                last_seen,
            },
        );
        !previous.is_some_and(|s| s.connected == connected)
    }

    pub fn is_connected(&self, controller: &str) -> bool {
        self.states.get(controller).is_some_and(|s| s.connected)
    }

    pub fn state(&self, controller: &str) -> Option<ConnectionState> {
        self.states.get(controller).copied()
    }

    pub fn connected_count(&self) -> usize {
        self.states.values().filter(|s| s.connected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn never_seen_controller_is_disconnected() {
        let tracker = ConnectivityTracker::new();
        assert!(!tracker.is_connected("PLC-00"));
        assert!(tracker.state("PLC-00").is_none());
    }

    #[test]
    fn update_overwrites_unconditionally() {
        let mut tracker = ConnectivityTracker::new();
        let t0 = Instant::now();
        tracker.update("PLC-00", true, t0);
        assert!(tracker.is_connected("PLC-00"));
        tracker.update("PLC-00", false, t0 + Duration::from_millis(500));
        assert!(!tracker.is_connected("PLC-00"));
        tracker.update("PLC-00", true, t0 + Duration::from_millis(1000));
        assert!(tracker.is_connected("PLC-00"));
    }

    #[test]
    fn update_is_idempotent() {
        let mut tracker = ConnectivityTracker::new();
        let t0 = Instant::now();
        tracker.update("PLC-03", true, t0);
        let first = tracker.state("PLC-03");
        tracker.update("PLC-03", true, t0);
        assert_eq!(tracker.state("PLC-03"), first);
    }

    #[test]
    fn last_seen_survives_disconnect() {
        let mut tracker = ConnectivityTracker::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        tracker.update("PLC-01", true, t0);
        tracker.update("PLC-01", false, t1);
        let state = tracker.state("PLC-01").unwrap();
        assert!(!state.connected);
        assert_eq!(state.last_seen, Some(t0));
    }

    #[test]
    fn first_disconnected_report_has_no_last_seen() {
        let mut tracker = ConnectivityTracker::new();
        tracker.update("PLC-05", false, Instant::now());
        assert_eq!(tracker.state("PLC-05").unwrap().last_seen, None);
    }

    #[test]
    fn update_reports_transitions_only() {
        let mut tracker = ConnectivityTracker::new();
        let now = Instant::now();
        assert!(tracker.update("PLC-02", false, now));
        assert!(!tracker.update("PLC-02", false, now));
        assert!(tracker.update("PLC-02", true, now));
        assert!(!tracker.update("PLC-02", true, now));
        assert!(tracker.update("PLC-02", false, now));
    }

    #[test]
    fn first_report_is_a_change_either_way() {
        let mut tracker = ConnectivityTracker::new();
        let now = Instant::now();
        assert!(tracker.update("PLC-03", false, now), "down from startup");
        assert!(tracker.update("PLC-04", true, now));
    }

    #[test]
    fn connected_count_tracks_current_states() {
        let mut tracker = ConnectivityTracker::new();
        let now = Instant::now();
        tracker.update("PLC-00", true, now);
        tracker.update("PLC-01", true, now);
        tracker.update("PLC-02", false, now);
        assert_eq!(tracker.connected_count(), 2);
    }
}
