//! Shared subsystem handle.
//!
//! Subsystems live in `Rc<RefCell<_>>` so the scheduler, triggers, actions and
//! coordinators can all reach them from the one scheduler thread. Borrows are
//! short and never held across a tick; a reentrant mutable borrow (for example
//! a `transition()` that commands its own handle) panics.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::scheduler::compose::WaitUntil;
use crate::scheduler::runner::Refresh;

use super::machine::SubsystemId;
use super::overrides::{GoalOverrideAction, OverrideAction};
use super::subsystem::Subsystem;

pub struct Handle<T> {
    id: SubsystemId,
    inner: Rc<RefCell<T>>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Subsystem> Handle<T> {
    pub fn new(subsystem: T) -> Self {
        Self {
            id: subsystem.machine().id().clone(),
            inner: Rc::new(RefCell::new(subsystem)),
        }
    }

    #[inline]
    pub fn id(&self) -> &SubsystemId {
        &self.id
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    pub fn state(&self) -> T::State {
        self.inner.borrow().state()
    }

    pub fn managed_state(&self) -> T::State {
        self.inner.borrow().machine().managed_state()
    }

    pub fn is_overridden(&self) -> bool {
        self.inner.borrow().machine().override_active()
    }

    /// Request `state` through the subsystem's non-override path.
    pub fn set_state(&self, state: T::State) {
        self.inner.borrow_mut().set_state(state);
    }

    /// Long-lived action forcing `state` until it is ended.
    pub fn override_state(&self, state: T::State) -> OverrideAction<T> {
        OverrideAction::new(self.clone(), state)
    }

    /// Long-lived action forcing the goal report to `value` until it is ended.
    pub fn override_goal(&self, value: bool) -> GoalOverrideAction<T> {
        GoalOverrideAction::new(self.clone(), value)
    }

    /// Finishes once the subsystem is in `state`.
    pub fn wait_for(&self, state: T::State) -> WaitUntil {
        let inner = Rc::clone(&self.inner);
        WaitUntil::new(move || inner.borrow().in_state(state))
    }

    /// Finishes once the subsystem is in any of `states`.
    pub fn wait_for_any(&self, states: &[T::State]) -> WaitUntil {
        let inner = Rc::clone(&self.inner);
        let states = states.to_vec();
        WaitUntil::new(move || states.contains(&inner.borrow().state()))
    }

    pub(crate) fn refresher(&self) -> Rc<RefCell<dyn Refresh>> {
        let inner: Rc<RefCell<T>> = Rc::clone(&self.inner);
        inner
    }
}

impl<T: Subsystem> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").field("id", &self.id).finish_non_exhaustive()
    }
}
