/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Refresh throttle and re-entrancy guard.
//!
//! The timer fires every `tick`; [`RefreshScheduler::tick`] decides whether
//! that tick starts a refresh cycle:
//!
//! ```text
//!            tick && due && Idle
//!   Idle ─────────────────────────► Running
//!    ▲                                 │
//!    └──── cycle returns / unwinds ────┘   (last_refresh = cycle start)
//!
//!   tick while Running  → Busy   (dropped, never queued)
//!   tick before due     → NotDue (dropped)
//! ```
//!
//! The state lives inside the scheduler and is only changed under its lock;
//! the lock is not held while the cycle runs, so a tick issued from inside a
//! cycle observes `Running` and is dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::config::RefreshTiming;

/// Scheduler state.  `Running` doubles as the re-entrancy guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Running,
}

/// What a single timer tick did.
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome<R> {
    /// A cycle ran; carries its result.
    Ran(R),
    /// A cycle was already running; the tick was dropped.
    Busy,
    /// The minimum refresh interval has not elapsed yet.
    NotDue { remaining: Duration },
}

impl<R> TickOutcome<R> {
    pub fn ran(&self) -> bool {
        matches!(self, TickOutcome::Ran(_))
    }
}

#[derive(Debug)]
struct Inner {
    state: RefreshState,
    last_refresh: Option<Instant>,
    cycles: u64,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    min_interval: Duration,
    inner: Mutex<Inner>,
}

impl RefreshScheduler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            inner: Mutex::new(Inner {
                state: RefreshState::Idle,
                last_refresh: None,
                cycles: 0,
            }),
        }
    }

    pub fn from_timing(timing: &RefreshTiming) -> Self {
        Self::new(timing.min_interval)
    }

    /// Handles one timer tick at `now`.
    ///
    /// Runs `cycle(now)` when the scheduler is idle and at least
    /// `min_interval` has passed since the previous cycle started.
    ///
    /// The first tick is always due: the throttle starts at the first cycle,
    /// not at construction, so the display fills without waiting a full
    /// interval after startup.  Whatever way the cycle exits, the guard is
    /// released and `now` becomes the last refresh time.
    pub fn tick<R>(&self, now: Instant, cycle: impl FnOnce(Instant) -> R) -> TickOutcome<R> {
        {
            let mut inner = self.lock();
            if inner.state == RefreshState::Running {
                trace!("refresh cycle still running, tick dropped");
                return TickOutcome::Busy;
            }
            if let Some(last) = inner.last_refresh {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.min_interval {
                    return TickOutcome::NotDue {
                        remaining: self.min_interval - elapsed,
                    };
                }
            }
            inner.state = RefreshState::Running;
        }

        let _guard = RunningGuard {
            scheduler: self,
            started_at: now,
        };
        TickOutcome::Ran(cycle(now))
    }

    pub fn state(&self) -> RefreshState {
        self.lock().state
    }

    /// Start time of the most recent completed cycle.
    pub fn last_refresh(&self) -> Option<Instant> {
        self.lock().last_refresh
    }

    /// Number of cycles that have exited, successfully or not.
    pub fn cycles(&self) -> u64 {
        self.lock().cycles
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The lock is never held across user code, so poisoning carries no
        // half-written state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the scheduler to `Idle` when the cycle exits, including by panic.
struct RunningGuard<'a> {
    scheduler: &'a RefreshScheduler,
    started_at: Instant,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.scheduler.lock();
        inner.state = RefreshState::Idle;
        inner.last_refresh = Some(self.started_at);
        inner.cycles += 1;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    // ── Throttle ──────────────────────────────────────────────────────────────

    #[test]
    fn first_tick_is_due_immediately() {
        let sched = RefreshScheduler::new(ms(500));
        assert_eq!(sched.tick(Instant::now(), |_| 7), TickOutcome::Ran(7));
        assert_eq!(sched.cycles(), 1);
    }

    #[test]
    fn ticks_fifty_ms_apart_run_one_cycle() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        let runs = Cell::new(0);

        sched.tick(t0, |_| runs.set(runs.get() + 1));
        let second = sched.tick(t0 + ms(50), |_| runs.set(runs.get() + 1));

        assert_eq!(runs.get(), 1);
        assert_eq!(second, TickOutcome::NotDue { remaining: ms(450) });
    }

    #[test]
    fn cycles_never_start_closer_than_min_interval() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        let mut starts = Vec::new();

        // 100 ms timer for 3 s
        for i in 0..=30u64 {
            if let TickOutcome::Ran(start) = sched.tick(t0 + ms(i * 100), |s| s) {
                starts.push(start);
            }
        }

        assert_eq!(starts.len(), 7, "0, 500, ..., 3000 ms");
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= ms(500));
        }
    }

    #[test]
    fn irregular_ticks_still_respect_interval() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        let offsets = [0, 30, 470, 499, 500, 505, 990, 1001, 1003, 1600];
        let mut starts = Vec::new();
        for off in offsets {
            if let TickOutcome::Ran(s) = sched.tick(t0 + ms(off), |s| s) {
                starts.push(s);
            }
        }
        assert_eq!(starts, vec![t0, t0 + ms(500), t0 + ms(1001), t0 + ms(1600)]);
    }

    #[test]
    fn last_refresh_is_cycle_start_time() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        assert_eq!(sched.last_refresh(), None);
        sched.tick(t0, |_| ());
        assert_eq!(sched.last_refresh(), Some(t0));
    }

    #[test]
    fn clock_going_backwards_is_not_due() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now() + ms(1000);
        sched.tick(t0, |_| ());
        assert!(!sched.tick(t0 - ms(200), |_| ()).ran());
    }

    // ── Re-entrancy guard ─────────────────────────────────────────────────────

    #[test]
    fn tick_during_running_cycle_is_dropped() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        let active = Cell::new(0u32);
        let max_active = Cell::new(0u32);

        let outcome = sched.tick(t0, |_| {
            active.set(active.get() + 1);
            max_active.set(max_active.get().max(active.get()));
            assert_eq!(sched.state(), RefreshState::Running);

            // A tick arriving while this cycle runs, even one that is due.
            let nested = sched.tick(t0 + ms(600), |_| {
                active.set(active.get() + 1);
                max_active.set(max_active.get().max(active.get()));
                active.set(active.get() - 1);
            });

            active.set(active.get() - 1);
            nested
        });

        assert_eq!(outcome, TickOutcome::Ran(TickOutcome::Busy));
        assert_eq!(max_active.get(), 1);
        assert_eq!(sched.state(), RefreshState::Idle);
        assert_eq!(sched.cycles(), 1);
    }

    #[test]
    fn dropped_tick_is_not_queued() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        sched.tick(t0, |_| {
            assert_eq!(sched.tick(t0 + ms(700), |_| ()), TickOutcome::Busy);
        });
        // Only the outer cycle counted; the busy tick left nothing behind.
        assert_eq!(sched.cycles(), 1);
        assert_eq!(sched.last_refresh(), Some(t0));
        assert!(sched.tick(t0 + ms(500), |_| ()).ran());
    }

    #[test]
    fn panicking_cycle_releases_guard() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();

        let result = catch_unwind(AssertUnwindSafe(|| {
            sched.tick(t0, |_| -> () { panic!("data source blew up") });
        }));
        assert!(result.is_err());

        assert_eq!(sched.state(), RefreshState::Idle);
        assert_eq!(sched.last_refresh(), Some(t0));
        assert!(sched.tick(t0 + ms(500), |_| ()).ran());
    }

    #[test]
    fn failed_cycle_result_is_returned_and_guard_released() {
        let sched = RefreshScheduler::new(ms(500));
        let t0 = Instant::now();
        let outcome = sched.tick(t0, |_| Err::<(), &str>("source timeout"));
        assert_eq!(outcome, TickOutcome::Ran(Err("source timeout")));
        assert_eq!(sched.state(), RefreshState::Idle);
    }
}
