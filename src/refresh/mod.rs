//! The refresh loop driving the pipeline.
//!
//! Two ways to drive it, matching how the dashboard runs:
//!
//! - [`RefreshLoop::run`]: blocking loop for headless mode. Tick, hand the
//!   report to a callback, pause for the interval, repeat until stopped.
//! - [`RefreshLoop::poll`]: non-blocking; ticks only once the interval has
//!   elapsed. The TUI calls it between input polls.
//!
//! Stopping is cooperative: the [`StopSignal`] is checked between ticks and
//! during the pause, never mid-tick.

pub mod clock;
pub mod pipeline;

pub use clock::{Clock, SystemClock};
pub use pipeline::{Pipeline, TickReport};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{NoxError, Result};

/// Granularity at which a pause re-checks the stop signal.
const STOP_CHECK_SLICE: Duration = Duration::from_millis(100);

/// Cloneable stop flag shared between the loop and whoever ends it.
///
/// Backed by a watch channel so the flag can be set from another thread
/// (e.g. a Ctrl-C handler) and observed without blocking.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request the loop to stop after the current tick.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Receiver that flips to `true` once stop is requested.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Drives a [`Pipeline`] at a fixed interval.
#[derive(Debug)]
pub struct RefreshLoop<C: Clock = SystemClock> {
    pipeline: Pipeline,
    clock: C,
    interval: Duration,
    stop: StopSignal,
    last_tick: Option<Instant>,
    ticks: u64,
    feed: watch::Sender<Option<TickReport>>,
}

impl RefreshLoop<SystemClock> {
    pub fn new(pipeline: Pipeline, interval: Duration) -> Self {
        Self::with_clock(pipeline, interval, SystemClock)
    }
}

impl<C: Clock> RefreshLoop<C> {
    pub fn with_clock(pipeline: Pipeline, interval: Duration, clock: C) -> Self {
        let (feed, _rx) = watch::channel(None);
        Self {
            pipeline,
            clock,
            interval,
            stop: StopSignal::new(),
            last_tick: None,
            ticks: 0,
            feed,
        }
    }

    /// Handle that stops this loop.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Latest tick report, for consumers outside the render loop.
    pub fn subscribe(&self) -> watch::Receiver<Option<TickReport>> {
        self.feed.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Time since the last tick started, if any tick has run.
    pub fn since_last_tick(&self) -> Option<Duration> {
        self.last_tick
            .map(|t| self.clock.now().saturating_duration_since(t))
    }

    /// Whether the interval has elapsed since the last tick. The first tick
    /// is always due.
    pub fn is_due(&self) -> bool {
        self.since_last_tick()
            .is_none_or(|elapsed| elapsed >= self.interval)
    }

    /// Run a tick immediately, regardless of the schedule.
    pub fn tick_now(&mut self) -> Result<TickReport> {
        self.last_tick = Some(self.clock.now());
        let mut report = self.pipeline.tick(self.clock.wall_now())?;
        self.ticks += 1;
        report.seq = self.ticks;

        debug!(
            seq = report.seq,
            prediction = report.prediction,
            status = %report.quality,
            "tick"
        );
        self.feed.send_replace(Some(report.clone()));
        Ok(report)
    }

    /// Tick if due and not stopped; otherwise return `None` immediately.
    pub fn poll(&mut self) -> Result<Option<TickReport>> {
        if self.stop.is_stopped() || !self.is_due() {
            return Ok(None);
        }
        self.tick_now().map(Some)
    }

    /// Blocking loop: tick, call `on_tick`, pause, until the stop signal is
    /// set. Returns the number of ticks run.
    ///
    /// A tick that takes longer than the interval is not compensated for;
    /// the pause always follows the tick in full.
    pub fn run<F, E>(&mut self, mut on_tick: F) -> std::result::Result<u64, E>
    where
        F: FnMut(&TickReport) -> std::result::Result<(), E>,
        E: From<NoxError>,
    {
        while !self.stop.is_stopped() {
            let report = self.tick_now()?;
            on_tick(&report)?;
            self.pause();
        }
        Ok(self.ticks)
    }

    fn pause(&self) {
        let mut remaining = self.interval;
        while !remaining.is_zero() && !self.stop.is_stopped() {
            let step = remaining.min(STOP_CHECK_SLICE);
            self.clock.sleep(step);
            remaining -= step;
        }
    }
}
