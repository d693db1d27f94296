//! Live-tunable numeric configuration.
//!
//! A [`TunableNumber`] reads from the shared live table while tuning mode is
//! enabled and from a frozen constant otherwise. Flipping tuning mode takes
//! effect on the next [`Tuning::refresh`]:
//!
//! - enable: each tunable publishes its current value as the live default
//!   (an existing live entry wins) and starts following the table;
//! - disable: each tunable freezes whatever value it last returned and
//!   ignores further edits.
//!
//! Every key lives under [`TUNING_ROOT`]. With a sink attached, the applied
//! mode is published under [`TUNING_ENABLED_KEY`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{TUNING_ENABLED_KEY, TUNING_ROOT};
use crate::telemetry::TelemetrySink;

/// Errors raised while building tunables at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TunableError {
    /// A construction call received arguments violating its contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Global tuning-mode flag plus the live value table.
#[derive(Default)]
pub struct Tuning {
    requested: Cell<bool>,
    applied: Cell<bool>,
    live: RefCell<HashMap<String, f64>>,
    registry: RefCell<Vec<Weak<TunableNumber>>>,
    sink: RefCell<Option<Rc<dyn TelemetrySink>>>,
}

impl fmt::Debug for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tuning")
            .field("enabled", &self.applied.get())
            .field("live", &self.live.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Tuning {
    /// Create a store with tuning mode initially `enabled`.
    pub fn new(enabled: bool) -> Rc<Self> {
        Rc::new(Self {
            requested: Cell::new(enabled),
            applied: Cell::new(enabled),
            ..Self::default()
        })
    }

    /// Whether tunables are currently backed by the live table.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.applied.get()
    }

    /// Publish the applied mode to `sink` now and on every flip.
    pub fn attach(&self, sink: Rc<dyn TelemetrySink>) {
        sink.record(TUNING_ENABLED_KEY, self.applied.get().into());
        *self.sink.borrow_mut() = Some(sink);
    }

    /// Request a tuning-mode change; applied by [`Tuning::refresh`].
    pub fn set_enabled(&self, enabled: bool) {
        self.requested.set(enabled);
    }

    /// Apply a pending tuning-mode change to every registered tunable.
    ///
    /// Returns `true` if the mode flipped.
    pub fn refresh(&self) -> bool {
        let requested = self.requested.get();
        if requested == self.applied.get() {
            return false;
        }
        self.applied.set(requested);

        let mut registry = self.registry.borrow_mut();
        registry.retain(|weak| weak.strong_count() > 0);
        let tunables: Vec<Rc<TunableNumber>> = registry.iter().filter_map(Weak::upgrade).collect();
        drop(registry);

        for tunable in &tunables {
            tunable.rebacked(self, requested);
        }
        if let Some(sink) = self.sink.borrow().as_ref() {
            sink.record(TUNING_ENABLED_KEY, requested.into());
        }
        info!(enabled = requested, tunables = tunables.len(), "tuning mode changed");
        true
    }

    /// Edit a live value, as an operator dashboard would.
    ///
    /// `key` is the full key including [`TUNING_ROOT`], or a relative key
    /// which is prefixed automatically.
    pub fn set_live(&self, key: &str, value: f64) {
        let key = full_key(key);
        debug!(%key, value, "live tunable edited");
        self.live.borrow_mut().insert(key, value);
    }

    /// Current live-table value for `key` (full or relative).
    pub fn live(&self, key: &str) -> Option<f64> {
        self.live.borrow().get(&full_key(key)).copied()
    }

    /// Number of tunables still alive and registered.
    pub fn registered(&self) -> usize {
        self.registry
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Create and register a tunable number under `key` with `default`.
    pub fn number(self: &Rc<Self>, key: &str, default: f64) -> Rc<TunableNumber> {
        let number = Rc::new(TunableNumber {
            key: full_key(key),
            tuning: Rc::clone(self),
            backing: Cell::new(Backing::Static(default)),
            last_seen: RefCell::new(HashMap::new()),
        });
        if self.is_enabled() {
            number.rebacked(self, true);
        }
        self.registry.borrow_mut().push(Rc::downgrade(&number));
        number
    }

    /// Create a PID gain set under `key` (`<key>/kP`, `<key>/kI`, `<key>/kD`).
    pub fn pid(self: &Rc<Self>, key: &str, kp: f64, ki: f64, kd: f64) -> TunablePid {
        TunablePid {
            kp: self.number(&format!("{key}/kP"), kp),
            ki: self.number(&format!("{key}/kI"), ki),
            kd: self.number(&format!("{key}/kD"), kd),
        }
    }

    fn publish_default(&self, key: &str, value: f64) -> f64 {
        *self.live.borrow_mut().entry(key.to_string()).or_insert(value)
    }
}

fn full_key(key: &str) -> String {
    if key.starts_with(TUNING_ROOT) {
        key.to_string()
    } else {
        format!("{TUNING_ROOT}{}", key.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Backing {
    Static(f64),
    Live { fallback: f64 },
}

/// A numeric value that can be adjusted at runtime while tuning mode is on.
#[derive(Debug)]
pub struct TunableNumber {
    key: String,
    tuning: Rc<Tuning>,
    backing: Cell<Backing>,
    last_seen: RefCell<HashMap<u64, f64>>,
}

impl TunableNumber {
    /// Full key, including [`TUNING_ROOT`].
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value.
    pub fn get(&self) -> f64 {
        match self.backing.get() {
            Backing::Static(value) => value,
            Backing::Live { fallback } => self.tuning.live(&self.key).unwrap_or(fallback),
        }
    }

    /// Whether the value changed since `caller` last asked.
    ///
    /// The first call for a given caller always reports a change, in either
    /// tuning mode; a frozen tunable never reports one after that.
    pub fn has_changed(&self, caller: u64) -> bool {
        let current = self.get();
        let mut seen = self.last_seen.borrow_mut();
        match seen.insert(caller, current) {
            Some(previous) => previous != current,
            None => true,
        }
    }

    /// Whether this tunable currently follows the live table.
    pub fn is_live(&self) -> bool {
        matches!(self.backing.get(), Backing::Live { .. })
    }

    fn rebacked(&self, tuning: &Tuning, enabled: bool) {
        let current = self.get();
        let backing = if enabled {
            Backing::Live {
                fallback: tuning.publish_default(&self.key, current),
            }
        } else {
            Backing::Static(current)
        };
        self.backing.set(backing);
    }
}

/// Proportional/integral/derivative gains tuned as a group.
#[derive(Debug, Clone)]
pub struct TunablePid {
    kp: Rc<TunableNumber>,
    ki: Rc<TunableNumber>,
    kd: Rc<TunableNumber>,
}

impl TunablePid {
    pub fn kp(&self) -> f64 {
        self.kp.get()
    }

    pub fn ki(&self) -> f64 {
        self.ki.get()
    }

    pub fn kd(&self) -> f64 {
        self.kd.get()
    }

    /// `(kp, ki, kd)` snapshot.
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp(), self.ki(), self.kd())
    }

    /// Whether any gain changed since `caller` last asked.
    ///
    /// All three gains are checked so each one's per-caller memory stays
    /// current.
    pub fn has_changed(&self, caller: u64) -> bool {
        let p = self.kp.has_changed(caller);
        let i = self.ki.has_changed(caller);
        let d = self.kd.has_changed(caller);
        p || i || d
    }
}
