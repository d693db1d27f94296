//! Scheduled unit of behaviour.

use std::fmt;

use super::ownership::Claim;

/// Scheduler-assigned action identity. Never reused within a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) u64);

impl ActionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an action does to the subsystems it claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionKind {
    /// Ordinary commanding through `set_state`.
    #[default]
    Automation,
    /// Forces a subsystem's state.
    StateOverride,
    /// Forces a subsystem's goal report.
    GoalOverride,
}

/// How an owner reacts to a contender for one of its claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptBehavior {
    /// The owner is ended and the contender starts.
    #[default]
    CancelSelf,
    /// The contender is rejected.
    CancelIncoming,
}

/// Why an action's `end` hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `is_finished` returned true.
    Finished,
    /// Explicit cancel.
    Cancelled,
    /// A newly scheduled action took one of its claims.
    Superseded { by: ActionKind },
}

impl EndReason {
    /// Anything but a natural finish.
    #[inline]
    pub const fn is_interrupted(self) -> bool {
        !matches!(self, Self::Finished)
    }
}

/// Lifecycle hooks called by the scheduler.
///
/// `start` runs once when scheduled, `execute` then `is_finished` once per
/// tick, and `end` exactly once with the reason it stopped. A superseded
/// action additionally gets `handed_over` once its successor has started.
pub trait Action {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Claims held for the action's whole lifetime.
    fn claims(&self) -> &[Claim] {
        &[]
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Automation
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        InterruptBehavior::CancelSelf
    }

    fn start(&mut self) {}

    fn execute(&mut self) {}

    fn is_finished(&self) -> bool {
        false
    }

    fn end(&mut self, _reason: EndReason) {}

    /// Runs after the action that superseded this one has started.
    fn handed_over(&mut self) {}
}

impl Action for Box<dyn Action> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn claims(&self) -> &[Claim] {
        (**self).claims()
    }

    fn kind(&self) -> ActionKind {
        (**self).kind()
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        (**self).interrupt_behavior()
    }

    fn start(&mut self) {
        (**self).start();
    }

    fn execute(&mut self) {
        (**self).execute();
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn end(&mut self, reason: EndReason) {
        (**self).end(reason);
    }

    fn handed_over(&mut self) {
        (**self).handed_over();
    }
}
