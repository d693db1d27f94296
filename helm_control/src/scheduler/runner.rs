//! Fixed-tick cooperative scheduler.
//!
//! One `run_tick` call:
//!
//! 1. refresh every registered subsystem (registration order);
//! 2. poll every trigger (binding order);
//! 3. execute every scheduled action (scheduling order), ending and
//!    releasing the ones that finish.
//!
//! Scheduling arbitrates claims synchronously. Owners of conflicting claims
//! are ended with [`EndReason::Superseded`] before the newcomer starts, unless
//! one of them declares [`InterruptBehavior::CancelIncoming`], in which case
//! the newcomer is rejected and nothing changes. Superseded owners get
//! [`Action::handed_over`] after the newcomer's `start`.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::state::handle::Handle;
use crate::state::machine::SubsystemId;
use crate::state::subsystem::Subsystem;

use super::action::{Action, ActionId, EndReason, InterruptBehavior};
use super::ownership::{Claim, OwnershipTable};
use super::trigger::Trigger;

/// Schedule refusals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A current owner refuses to be interrupted.
    #[error("{incoming} rejected: {claim} held by {held_by_name} ({held_by})")]
    Rejected {
        incoming: String,
        claim: Claim,
        held_by: ActionId,
        held_by_name: String,
    },
}

/// Per-tick input refresh, object-safe view of a registered subsystem.
pub trait Refresh {
    fn refresh(&mut self);
}

impl<T: Subsystem> Refresh for T {
    fn refresh(&mut self) {
        self.update();
    }
}

struct Scheduled {
    id: ActionId,
    action: Box<dyn Action>,
}

/// Single-threaded action scheduler.
#[derive(Default)]
pub struct Scheduler {
    subsystems: Vec<(SubsystemId, Rc<RefCell<dyn Refresh>>)>,
    triggers: Vec<Trigger>,
    actions: Vec<Scheduled>,
    ownership: OwnershipTable,
    next_id: u64,
    ticks: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh `handle` at the start of every tick. Registering twice is a no-op.
    pub fn register<T: Subsystem>(&mut self, handle: &Handle<T>) {
        if self.subsystems.iter().any(|(id, _)| id == handle.id()) {
            warn!(subsystem = %handle.id(), "subsystem already registered");
            return;
        }
        debug!(subsystem = %handle.id(), "subsystem registered");
        self.subsystems.push((handle.id().clone(), handle.refresher()));
    }

    /// Bind a trigger. Its condition is sampled once now.
    pub fn bind(&mut self, mut trigger: Trigger) {
        trigger.seed();
        debug!(trigger = trigger.name(), "trigger bound");
        self.triggers.push(trigger);
    }

    pub fn schedule(&mut self, action: impl Action + 'static) -> Result<ActionId, ScheduleError> {
        self.schedule_boxed(Box::new(action))
    }

    /// Arbitrate claims, then start `action`.
    pub fn schedule_boxed(&mut self, mut action: Box<dyn Action>) -> Result<ActionId, ScheduleError> {
        let claims = action.claims().to_vec();
        let conflicts = self.ownership.conflicts(&claims);

        for (claim, owner) in &conflicts {
            let Some(held) = self.find(*owner) else {
                continue;
            };
            if held.action.interrupt_behavior() == InterruptBehavior::CancelIncoming {
                let err = ScheduleError::Rejected {
                    incoming: action.name().to_string(),
                    claim: claim.clone(),
                    held_by: *owner,
                    held_by_name: held.action.name().to_string(),
                };
                warn!(error = %err, "schedule rejected");
                return Err(err);
            }
        }

        let by = action.kind();
        let mut owners: Vec<ActionId> = conflicts.into_iter().map(|(_, owner)| owner).collect();
        owners.sort();
        owners.dedup();
        let superseded: Vec<Scheduled> = owners
            .into_iter()
            .filter_map(|owner| self.take_ended(owner, EndReason::Superseded { by }))
            .collect();

        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.ownership.acquire(&claims, id);
        debug!(action = action.name(), %id, ?by, "action scheduled");
        action.start();
        self.actions.push(Scheduled { id, action });

        for mut entry in superseded {
            entry.action.handed_over();
        }
        Ok(id)
    }

    /// End `id` with [`EndReason::Cancelled`]. Returns `false` if it was not scheduled.
    pub fn cancel(&mut self, id: ActionId) -> bool {
        self.end_action(id, EndReason::Cancelled)
    }

    /// Cancel every scheduled action, oldest first.
    pub fn cancel_all(&mut self) {
        let actions = mem::take(&mut self.actions);
        for mut entry in actions {
            self.ownership.release(entry.id);
            debug!(action = entry.action.name(), id = %entry.id, "action cancelled");
            entry.action.end(EndReason::Cancelled);
        }
    }

    /// Run one tick.
    pub fn run_tick(&mut self) {
        self.ticks += 1;
        trace!(tick = self.ticks, "tick");

        for (_, subsystem) in &self.subsystems {
            subsystem.borrow_mut().refresh();
        }

        let mut triggers = mem::take(&mut self.triggers);
        for trigger in &mut triggers {
            trigger.poll(self);
        }
        triggers.append(&mut self.triggers);
        self.triggers = triggers;

        let mut i = 0;
        while i < self.actions.len() {
            let entry = &mut self.actions[i];
            entry.action.execute();
            if entry.action.is_finished() {
                let mut entry = self.actions.remove(i);
                self.ownership.release(entry.id);
                debug!(action = entry.action.name(), id = %entry.id, "action finished");
                entry.action.end(EndReason::Finished);
            } else {
                i += 1;
            }
        }
    }

    pub fn is_scheduled(&self, id: ActionId) -> bool {
        self.find(id).is_some()
    }

    pub fn owner_of(&self, claim: &Claim) -> Option<ActionId> {
        self.ownership.owner_of(claim)
    }

    /// Name of a scheduled action.
    pub fn action_name(&self, id: ActionId) -> Option<&str> {
        self.find(id).map(|entry| entry.action.name())
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Number of scheduled actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn find(&self, id: ActionId) -> Option<&Scheduled> {
        self.actions.iter().find(|entry| entry.id == id)
    }

    fn end_action(&mut self, id: ActionId, reason: EndReason) -> bool {
        self.take_ended(id, reason).is_some()
    }

    /// Remove `id`, release its claims and run its `end` hook.
    fn take_ended(&mut self, id: ActionId, reason: EndReason) -> Option<Scheduled> {
        let index = self.actions.iter().position(|entry| entry.id == id)?;
        let mut entry = self.actions.remove(index);
        self.ownership.release(id);
        debug!(action = entry.action.name(), %id, ?reason, "action ended");
        entry.action.end(reason);
        Some(entry)
    }
}
