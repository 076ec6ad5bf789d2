/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timer wiring for the refresh pipeline.
//!
//! [`RefreshService`] owns everything one refresh cycle touches and drives it
//! from a tokio interval firing every `timing.tick`.  Cycles run inline on
//! the timer's task: the data-source calls are synchronous, so a slow source
//! delays the next tick rather than overlapping it, and missed ticks are
//! skipped instead of bursting.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::config::HmiConfig;
use crate::connectivity::ConnectivityTracker;
use crate::display::DisplaySink;
use crate::projector::{CycleReport, StateProjector};
use crate::scheduler::{RefreshScheduler, TickOutcome};
use crate::source::DataSource;

pub struct RefreshService<S, D> {
    scheduler: RefreshScheduler,
    projector: StateProjector,
    tracker: ConnectivityTracker,
    source: S,
    sink: D,
    period: Duration,
}

impl<S: DataSource, D: DisplaySink> RefreshService<S, D> {
    pub fn new(config: Arc<HmiConfig>, source: S, sink: D) -> Self {
        let timing = config.timing;
        Self {
            scheduler: RefreshScheduler::from_timing(&timing),
            projector: StateProjector::new(config),
            tracker: ConnectivityTracker::new(),
            source,
            sink,
            period: timing.tick,
        }
    }

    /// Handles a single timer tick at `now`.
    pub fn tick(&mut self, now: Instant) -> TickOutcome<CycleReport> {
        let Self {
            scheduler,
            projector,
            tracker,
            source,
            sink,
            ..
        } = self;
        scheduler.tick(now, |started| projector.refresh(source, tracker, sink, started))
    }

    /// Ticks every `timing.tick` until `shutdown` resolves or `max_cycles`
    /// cycles have run.  Returns the number of cycles run.
    pub async fn run_until<F>(&mut self, shutdown: F, max_cycles: Option<u64>) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            tick = ?self.period,
            min_interval = ?self.scheduler.min_interval(),
            "refresh loop started"
        );

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!(cycles, "shutdown requested, refresh loop stopping");
                    break;
                }

                fired = interval.tick() => {
                    if self.tick(fired.into_std()).ran() {
                        cycles += 1;
                        if max_cycles.is_some_and(|max| cycles >= max) {
                            info!(cycles, "cycle limit reached, refresh loop stopping");
                            break;
                        }
                    }
                }
            }
        }
        cycles
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn tracker(&self) -> &ConnectivityTracker {
        &self.tracker
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefreshTiming;
    use crate::display::{Payload, ReadingBoard};
    use crate::source::SimulatedSource;
    use crate::topology::{LineId, ReadingCategory};

    fn service(tick_ms: u64, min_ms: u64) -> RefreshService<SimulatedSource, ReadingBoard> {
        let timing = RefreshTiming::from_millis(tick_ms, min_ms).unwrap();
        let config = Arc::new(HmiConfig::reference().with_timing(timing));
        RefreshService::new(config, SimulatedSource::new(), ReadingBoard::new())
    }

    #[test]
    fn single_tick_fills_the_board() {
        let mut svc = service(100, 500);
        let outcome = svc.tick(Instant::now());

        match outcome {
            TickOutcome::Ran(report) => {
                assert_eq!(report.controllers, 6);
                assert_eq!(report.line_readings, 12);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
        assert!(svc.sink().is_connected("PLC-00"));
        assert_eq!(
            svc.sink()
                .line(LineId::Weline, ReadingCategory::Sensor)
                .map(Payload::len),
            Some(17)
        );
    }

    #[test]
    fn going_offline_blanks_readings_on_next_cycle() {
        let mut svc = service(100, 500);
        let t0 = Instant::now();
        svc.tick(t0);

        svc.source_mut().set_online("PLC-03", false);
        assert!(svc.tick(t0 + Duration::from_millis(500)).ran());

        assert!(!svc.tracker().is_connected("PLC-04"));
        assert_eq!(
            svc.sink().line(LineId::Nsline, ReadingCategory::StationSignal),
            Some(&Payload::Unavailable)
        );
        assert!(svc
            .sink()
            .line(LineId::Nsline, ReadingCategory::Signal)
            .is_some_and(Payload::is_available));
    }

    #[tokio::test(start_paused = true)]
    async fn loop_refreshes_at_min_interval_not_tick_rate() {
        let mut svc = service(100, 500);
        // Ticks at 0, 100, ..., 1000 ms; cycles at 0, 500 and 1000 ms.
        let cycles = svc
            .run_until(tokio::time::sleep(Duration::from_millis(1_050)), None)
            .await;
        assert_eq!(cycles, 3);
        assert_eq!(svc.scheduler().cycles(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_after_cycle_limit() {
        let mut svc = service(50, 200);
        let cycles = svc.run_until(std::future::pending(), Some(4)).await;
        assert_eq!(cycles, 4);
    }
}
