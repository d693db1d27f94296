//! Override capabilities embedded in a [`StateMachine`](super::machine::StateMachine).
//!
//! Both the state override and the goal override follow one contract: an
//! `(active, value)` pair that is engaged by an override action's start hook,
//! released by its end hook, and mirrored to telemetry on every change.
//! Ordinary automation never touches these flags.
//!
//! Precedence lives here and nowhere else:
//! - a state request is recorded as the managed state, and forwarded to the
//!   machine only while no state override is active;
//! - a goal query returns the override value while a goal override is active.

use helm_common::telemetry::Telemetry;

use super::machine::fields;
use super::variant::StateVariant;

/// Engage/release contract shared by every override capability.
pub trait Capability {
    /// Forced value type.
    type Value: Copy;

    /// Start forcing `value`.
    fn engage(&mut self, value: Self::Value, telemetry: &Telemetry);

    /// Stop forcing. Returns `true` if the capability was active.
    fn release(&mut self, telemetry: &Telemetry) -> bool;

    /// Whether a value is currently being forced.
    fn is_active(&self) -> bool;
}

/// Raw `(active, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideFlag<V> {
    active: bool,
    value: V,
}

impl<V: Copy> OverrideFlag<V> {
    /// Inactive flag holding `idle` as its value.
    pub const fn new(idle: V) -> Self {
        Self {
            active: false,
            value: idle,
        }
    }

    #[inline]
    pub fn engage(&mut self, value: V) {
        self.active = true;
        self.value = value;
    }

    /// Deactivate and reset the value to `idle`. Returns the previous activity.
    #[inline]
    pub fn release(&mut self, idle: V) -> bool {
        let was_active = self.active;
        self.active = false;
        self.value = idle;
        was_active
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub const fn value(&self) -> V {
        self.value
    }

    /// `Some(value)` while active.
    #[inline]
    pub fn get(&self) -> Option<V> {
        self.active.then_some(self.value)
    }
}

/// State override plus managed-state bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct StateOverride<S> {
    flag: OverrideFlag<S>,
    managed: S,
}

impl<S: StateVariant> StateOverride<S> {
    pub const fn new(initial: S) -> Self {
        Self {
            flag: OverrideFlag::new(initial),
            managed: initial,
        }
    }

    /// Last state requested through the non-override path.
    #[inline]
    pub const fn managed(&self) -> S {
        self.managed
    }

    /// State currently forced, if any.
    #[inline]
    pub fn forced(&self) -> Option<S> {
        self.flag.get()
    }

    /// Record a request as the managed state.
    ///
    /// Returns `true` if the request may reach the machine (no override).
    pub fn record_request(&mut self, state: S, telemetry: &Telemetry) -> bool {
        self.managed = state;
        telemetry.record(fields::MANAGED_STATE, state.name());
        !self.flag.is_active()
    }
}

impl<S: StateVariant> Capability for StateOverride<S> {
    type Value = S;

    fn engage(&mut self, value: S, telemetry: &Telemetry) {
        self.flag.engage(value);
        telemetry.record(fields::STATE_OVERRIDE, true);
    }

    fn release(&mut self, telemetry: &Telemetry) -> bool {
        let was_active = self.flag.release(self.managed);
        telemetry.record(fields::STATE_OVERRIDE, false);
        was_active
    }

    fn is_active(&self) -> bool {
        self.flag.is_active()
    }
}

/// Goal-report override.
#[derive(Debug, Clone, Copy)]
pub struct GoalOverride {
    flag: OverrideFlag<bool>,
}

impl GoalOverride {
    pub const fn new() -> Self {
        Self {
            flag: OverrideFlag::new(false),
        }
    }

    /// Forced report while active.
    #[inline]
    pub fn forced(&self) -> Option<bool> {
        self.flag.get()
    }

    #[inline]
    pub const fn value(&self) -> bool {
        self.flag.value()
    }

    /// Report the forced value if active, otherwise run `evaluate`.
    pub fn report(&self, evaluate: impl FnOnce() -> bool) -> bool {
        match self.flag.get() {
            Some(forced) => forced,
            None => evaluate(),
        }
    }
}

impl Default for GoalOverride {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for GoalOverride {
    type Value = bool;

    fn engage(&mut self, value: bool, telemetry: &Telemetry) {
        self.flag.engage(value);
        telemetry.record(fields::GOAL_OVERRIDE_ACTIVE, true);
        telemetry.record(fields::GOAL_OVERRIDE_VALUE, value);
    }

    fn release(&mut self, telemetry: &Telemetry) -> bool {
        let was_active = self.flag.release(false);
        telemetry.record(fields::GOAL_OVERRIDE_ACTIVE, false);
        telemetry.record(fields::GOAL_OVERRIDE_VALUE, false);
        was_active
    }

    fn is_active(&self) -> bool {
        self.flag.is_active()
    }
}
