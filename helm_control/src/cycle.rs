//! Fixed-period tick loop.
//!
//! Drives a tick body either in real time (sleeping to the next period
//! boundary) or as fast as possible with simulated time, and keeps O(1)
//! timing statistics for the run report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

// ─── Tick Statistics ────────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick body duration [ns].
    pub last_tick_ns: i64,
    /// Minimum tick body duration [ns].
    pub min_tick_ns: i64,
    /// Maximum tick body duration [ns].
    pub max_tick_ns: i64,
    /// Running sum for average computation.
    pub sum_tick_ns: i64,
    /// Ticks whose body took longer than the period.
    pub overruns: u64,
}

impl TickStats {
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: i64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, duration_ns: i64) {
        self.tick_count += 1;
        self.last_tick_ns = duration_ns;
        self.min_tick_ns = self.min_tick_ns.min(duration_ns);
        self.max_tick_ns = self.max_tick_ns.max(duration_ns);
        self.sum_tick_ns += duration_ns;
    }

    /// Average tick body duration [ns] (0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> i64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_tick_ns / self.tick_count as i64
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Loop ───────────────────────────────────────────────────────────

/// How the loop paces ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Back-to-back ticks; the body advances simulated time itself.
    Simulated,
    /// Sleep to each period boundary on the monotonic clock.
    RealTime,
}

#[derive(Debug)]
pub struct TickLoop {
    period: Duration,
    pacing: Pacing,
    stats: TickStats,
}

impl TickLoop {
    pub fn new(period: Duration, pacing: Pacing) -> Self {
        Self {
            period,
            pacing,
            stats: TickStats::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Run `body` up to `ticks` times, stopping early once `running` clears.
    ///
    /// Returns the number of ticks executed.
    pub fn run(&mut self, ticks: u64, running: &AtomicBool, mut body: impl FnMut()) -> u64 {
        let period_ns = self.period.as_nanos() as i64;
        let mut next_wake = Instant::now();

        for tick in 0..ticks {
            if !running.load(Ordering::SeqCst) {
                info!(tick, "tick loop stopped");
                return tick;
            }

            let start = Instant::now();
            body();
            let duration_ns = start.elapsed().as_nanos() as i64;
            self.stats.record(duration_ns);

            if self.pacing == Pacing::RealTime {
                if duration_ns > period_ns {
                    self.stats.overruns += 1;
                    warn!(tick, duration_ns, period_ns, "tick overrun");
                }
                next_wake += self.period;
                if let Some(remaining) = next_wake.checked_duration_since(Instant::now()) {
                    std::thread::sleep(remaining);
                }
            }
        }
        ticks
    }
}
