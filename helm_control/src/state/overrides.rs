//! Override actions.
//!
//! Both actions hold their claim until ended and never finish on their own.
//! Bind them with `Trigger::while_true` for a hold-to-override control, or
//! race them against a [`WaitUntil`](crate::scheduler::WaitUntil) for a bounded
//! window.

use tracing::debug;

use crate::scheduler::action::{Action, ActionKind, EndReason};
use crate::scheduler::ownership::Claim;

use super::handle::Handle;
use super::subsystem::Subsystem;
use super::variant::StateVariant;

/// Forces a subsystem's state while scheduled.
///
/// Finishing or cancelling restores the managed state at once. When
/// superseded, the restore waits for the hand-over: it only happens if the
/// successor's `start` left the subsystem un-overridden and away from its
/// managed state.
pub struct OverrideAction<T: Subsystem> {
    handle: Handle<T>,
    state: T::State,
    claims: [Claim; 1],
    name: String,
    engaged: bool,
    restore_pending: bool,
}

impl<T: Subsystem> OverrideAction<T> {
    pub fn new(handle: Handle<T>, state: T::State) -> Self {
        let claims = [Claim::state(handle.id())];
        let name = format!("{}/OverrideState({})", handle.id(), state.name());
        Self {
            handle,
            state,
            claims,
            name,
            engaged: false,
            restore_pending: false,
        }
    }

    pub fn forced_state(&self) -> T::State {
        self.state
    }
}

impl<T: Subsystem> Action for OverrideAction<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn claims(&self) -> &[Claim] {
        &self.claims
    }

    fn kind(&self) -> ActionKind {
        ActionKind::StateOverride
    }

    fn start(&mut self) {
        self.engaged = self.handle.borrow_mut().begin_override(self.state);
    }

    fn end(&mut self, reason: EndReason) {
        if !self.engaged {
            return;
        }
        self.engaged = false;
        let superseded = matches!(reason, EndReason::Superseded { .. });
        debug!(action = %self.name, ?reason, "state override ending");
        self.handle.borrow_mut().end_override(!superseded);
        self.restore_pending = superseded;
    }

    fn handed_over(&mut self) {
        if !std::mem::take(&mut self.restore_pending) {
            return;
        }
        let mut subsystem = self.handle.borrow_mut();
        let machine = subsystem.machine();
        if machine.override_active() || machine.state() == machine.managed_state() {
            return;
        }
        debug!(action = %self.name, "restoring managed state after hand-over");
        subsystem.set_managed_state();
    }
}

/// Forces a subsystem's goal report while scheduled.
pub struct GoalOverrideAction<T: Subsystem> {
    handle: Handle<T>,
    value: bool,
    claims: [Claim; 1],
    name: String,
    engaged: bool,
}

impl<T: Subsystem> GoalOverrideAction<T> {
    pub fn new(handle: Handle<T>, value: bool) -> Self {
        let claims = [Claim::goal(handle.id())];
        let name = format!("{}/OverrideGoal({value})", handle.id());
        Self {
            handle,
            value,
            claims,
            name,
            engaged: false,
        }
    }
}

impl<T: Subsystem> Action for GoalOverrideAction<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn claims(&self) -> &[Claim] {
        &self.claims
    }

    fn kind(&self) -> ActionKind {
        ActionKind::GoalOverride
    }

    fn start(&mut self) {
        self.engaged = self
            .handle
            .borrow_mut()
            .machine_mut()
            .engage_goal_override(self.value);
    }

    fn end(&mut self, _reason: EndReason) {
        if std::mem::take(&mut self.engaged) {
            self.handle.borrow_mut().machine_mut().release_goal_override();
        }
    }
}
