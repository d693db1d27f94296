//! Per-subsystem state machine.
//!
//! `StateMachine<S>` owns the current state, the last-change timestamp and
//! the optional override capabilities. It never calls back into the owning
//! subsystem: the `transition()` hook is driven by the
//! [`Subsystem`](super::subsystem::Subsystem) provided methods, which use
//! [`StateMachine::request`] and friends and then run the hook.
//!
//! Three flavours share one type:
//!
//! | Constructor | State override | Goal override |
//! |-------------|----------------|---------------|
//! | [`StateMachine::new`] | no | no |
//! | [`StateMachine::overridable`] | yes | no |
//! | [`StateMachine::goal_overridable`] | yes | yes |

use std::fmt;
use std::rc::Rc;

use helm_common::clock::Clock;
use helm_common::telemetry::{Telemetry, TelemetrySink};
use tracing::{debug, warn};

use super::capability::{Capability, GoalOverride, StateOverride};
use super::variant::StateVariant;

/// Telemetry field names written under each machine's namespace.
pub mod fields {
    pub const CURRENT_STATE: &str = "CurrentState";
    pub const MANAGED_STATE: &str = "ManagedState";
    pub const STATE_OVERRIDE: &str = "StateOverride";
    pub const GOAL_OVERRIDE_ACTIVE: &str = "GoalOverrideActive";
    pub const GOAL_OVERRIDE_VALUE: &str = "GoalOverrideValue";
}

/// Identity of a subsystem; also its telemetry namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsystemId(Rc<str>);

impl SubsystemId {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collaborators every machine needs: a monotonic clock and a telemetry sink.
#[derive(Clone)]
pub struct MachineContext {
    pub clock: Rc<dyn Clock>,
    pub sink: Rc<dyn TelemetrySink>,
}

impl MachineContext {
    pub fn new(clock: Rc<dyn Clock>, sink: Rc<dyn TelemetrySink>) -> Self {
        Self { clock, sink }
    }
}

impl fmt::Debug for MachineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineContext")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

/// Current state, timestamp and override capabilities of one subsystem.
pub struct StateMachine<S: StateVariant> {
    id: SubsystemId,
    current: S,
    last_change: f64,
    clock: Rc<dyn Clock>,
    telemetry: Telemetry,
    state_override: Option<StateOverride<S>>,
    goal_override: Option<GoalOverride>,
}

impl<S: StateVariant> StateMachine<S> {
    /// Plain machine starting in `initial`.
    pub fn new(name: &str, initial: S, ctx: &MachineContext) -> Self {
        Self {
            id: SubsystemId::new(name),
            current: initial,
            last_change: 0.0,
            clock: Rc::clone(&ctx.clock),
            telemetry: Telemetry::new(name, Rc::clone(&ctx.sink)),
            state_override: None,
            goal_override: None,
        }
    }

    /// Machine with a state override capability.
    pub fn overridable(name: &str, initial: S, ctx: &MachineContext) -> Self {
        Self::new(name, initial, ctx).with_state_override()
    }

    /// Machine with both state and goal override capabilities.
    pub fn goal_overridable(name: &str, initial: S, ctx: &MachineContext) -> Self {
        Self::overridable(name, initial, ctx).with_goal_override()
    }

    /// Add a state override capability; managed state starts at the current state.
    pub fn with_state_override(mut self) -> Self {
        self.state_override = Some(StateOverride::new(self.current));
        self
    }

    pub fn with_goal_override(mut self) -> Self {
        self.goal_override = Some(GoalOverride::new());
        self
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    #[inline]
    pub fn id(&self) -> &SubsystemId {
        &self.id
    }

    #[inline]
    pub fn state(&self) -> S {
        self.current
    }

    #[inline]
    pub fn in_state(&self, state: S) -> bool {
        self.current == state
    }

    /// Clock reading [s] at the last actual state change; `0.0` before any.
    #[inline]
    pub fn last_state_change_timestamp(&self) -> f64 {
        self.last_change
    }

    /// Whether more than `duration` seconds passed since the last change.
    pub fn timeout(&self, duration: f64) -> bool {
        self.clock.now() - self.last_change > duration
    }

    /// Last state requested through [`request`](Self::request).
    ///
    /// Machines without a state override have no separate managed state and
    /// report the current one.
    pub fn managed_state(&self) -> S {
        self.state_override
            .as_ref()
            .map_or(self.current, StateOverride::managed)
    }

    pub fn is_overridable(&self) -> bool {
        self.state_override.is_some()
    }

    pub fn is_goal_overridable(&self) -> bool {
        self.goal_override.is_some()
    }

    pub fn override_active(&self) -> bool {
        self.state_override
            .as_ref()
            .is_some_and(|ov| ov.is_active())
    }

    /// State being forced by an active override.
    pub fn forced_state(&self) -> Option<S> {
        self.state_override.as_ref().and_then(StateOverride::forced)
    }

    /// Forced goal report, while a goal override is active.
    pub fn goal_override(&self) -> Option<bool> {
        self.goal_override.as_ref().and_then(GoalOverride::forced)
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    // ─── Mutation ───────────────────────────────────────────────────

    /// Apply a state request.
    ///
    /// On an overridable machine the request is always recorded as the
    /// managed state. Returns `true` if the request reached the machine, in
    /// which case the caller must run `transition()` even if nothing changed.
    pub fn request(&mut self, state: S) -> bool {
        if let Some(ov) = self.state_override.as_mut() {
            if !ov.record_request(state, &self.telemetry) {
                debug!(machine = %self.id, requested = state.name(), "request held by override");
                return false;
            }
        }
        self.assign(state);
        true
    }

    /// Force `state` and mark the override active.
    ///
    /// Managed state is left untouched. Returns `false` (and does nothing) on
    /// a machine without a state override capability.
    pub fn engage_override(&mut self, state: S) -> bool {
        if self.state_override.is_none() {
            warn!(machine = %self.id, forced = state.name(), "machine is not overridable");
            return false;
        }
        self.assign(state);
        if let Some(ov) = self.state_override.as_mut() {
            ov.engage(state, &self.telemetry);
        }
        debug!(machine = %self.id, forced = state.name(), "state override engaged");
        true
    }

    /// Clear the override flag. Returns `true` if one was active.
    ///
    /// Does not restore the managed state; see
    /// [`Subsystem::end_override`](super::subsystem::Subsystem::end_override).
    pub fn release_override(&mut self) -> bool {
        let Some(ov) = self.state_override.as_mut() else {
            return false;
        };
        let was_active = ov.release(&self.telemetry);
        debug!(machine = %self.id, managed = ov.managed().name(), "state override released");
        was_active
    }

    pub fn engage_goal_override(&mut self, value: bool) -> bool {
        let Some(goal) = self.goal_override.as_mut() else {
            warn!(machine = %self.id, "machine is not goal-overridable");
            return false;
        };
        goal.engage(value, &self.telemetry);
        debug!(machine = %self.id, value, "goal override engaged");
        true
    }

    pub fn release_goal_override(&mut self) -> bool {
        let Some(goal) = self.goal_override.as_mut() else {
            return false;
        };
        let was_active = goal.release(&self.telemetry);
        debug!(machine = %self.id, "goal override released");
        was_active
    }

    /// Base assignment path. Returns `true` on an actual change.
    fn assign(&mut self, state: S) -> bool {
        if state == self.current {
            return false;
        }
        let previous = self.current;
        self.current = state;
        self.telemetry.record(fields::CURRENT_STATE, state.name());
        self.last_change = self.clock.now();
        debug!(
            machine = %self.id,
            from = previous.name(),
            to = state.name(),
            at = self.last_change,
            "state changed"
        );
        true
    }
}

impl<S: StateVariant> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("last_change", &self.last_change)
            .field("state_override", &self.state_override)
            .field("goal_override", &self.goal_override)
            .finish_non_exhaustive()
    }
}
