//! Subsystem behaviour hooks.
//!
//! A subsystem owns a [`StateMachine`] and implements [`Subsystem::transition`].
//! Everything else (`set_state`, override begin/end, managed-state restore) is
//! provided, so the ordering between machine bookkeeping and the hook is the
//! same for every subsystem.

use super::machine::StateMachine;
use super::variant::StateVariant;

/// A physical or control unit driven as a state machine.
pub trait Subsystem: 'static {
    type State: StateVariant;

    fn machine(&self) -> &StateMachine<Self::State>;

    fn machine_mut(&mut self) -> &mut StateMachine<Self::State>;

    /// Apply the current state's outputs.
    ///
    /// Runs after every state request that reaches the machine, including
    /// requests for the state already held. May call [`set_state`](Self::set_state)
    /// to chain into another state.
    fn transition(&mut self);

    /// Per-tick input refresh. Must not block.
    fn update(&mut self) {}

    // ─── Provided ───────────────────────────────────────────────────

    fn state(&self) -> Self::State {
        self.machine().state()
    }

    fn in_state(&self, state: Self::State) -> bool {
        self.machine().in_state(state)
    }

    fn timeout(&self, duration: f64) -> bool {
        self.machine().timeout(duration)
    }

    /// Request `state`.
    ///
    /// While an override is active only the managed state is recorded and
    /// `transition()` does not run.
    fn set_state(&mut self, state: Self::State) {
        if self.machine_mut().request(state) {
            self.transition();
        }
    }

    /// Re-apply the managed state through [`set_state`](Self::set_state).
    fn set_managed_state(&mut self) {
        let managed = self.machine().managed_state();
        self.set_state(managed);
    }

    /// Force `state`, bypassing managed bookkeeping, then run `transition()`.
    ///
    /// Returns `false` without side effects on a non-overridable machine.
    fn begin_override(&mut self, state: Self::State) -> bool {
        if !self.machine_mut().engage_override(state) {
            return false;
        }
        self.transition();
        true
    }

    /// Drop the override; with `restore`, go back to the managed state.
    fn end_override(&mut self, restore: bool) {
        self.machine_mut().release_override();
        if restore {
            self.set_managed_state();
        }
    }
}

/// Subsystems that can report whether they reached their goal.
pub trait GoalReporting: Subsystem {
    /// Goal check from the subsystem's own measurements.
    fn evaluate_goal(&self) -> bool;

    /// Goal report as seen by automation; a goal override takes precedence.
    fn at_goal(&self) -> bool {
        self.machine()
            .goal_override()
            .unwrap_or_else(|| self.evaluate_goal())
    }
}
