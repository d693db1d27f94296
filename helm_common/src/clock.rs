//! Monotonic time source used for state-change timestamps and timeouts.
//!
//! All readings are seconds as `f64`. Machines hold the clock as
//! `Rc<dyn Clock>` so a simulation or test can swap in a [`ManualClock`].

use std::cell::Cell;
use std::time::Instant;

/// Monotonic clock reading in seconds.
pub trait Clock {
    /// Current time [s]. Never decreases.
    fn now(&self) -> f64;
}

/// Wall-clock monotonic time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Externally stepped clock for tests and accelerated simulation.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    /// Create a clock reading `start` seconds.
    pub fn starting_at(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Advance by `dt` seconds. Negative steps are ignored.
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.now.set(self.now.get() + dt);
        }
    }

    /// Jump to an absolute time, clamped so the clock never runs backwards.
    pub fn set(&self, t: f64) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> f64 {
        self.now.get()
    }
}
