//! Edge-detected condition bindings.
//!
//! A trigger's condition is sampled when it is bound and then once per tick;
//! bindings react to the edges between consecutive samples. A condition that
//! is already true at bind time therefore does not fire `on_true` until it
//! falls and rises again.

use tracing::warn;

use super::action::{Action, ActionId};
use super::runner::Scheduler;

type Factory = Box<dyn FnMut() -> Box<dyn Action>>;

enum Binding {
    OnTrue(Factory),
    OnFalse(Factory),
    WhileTrue {
        factory: Factory,
        running: Option<ActionId>,
    },
}

/// Condition plus the actions bound to its edges.
pub struct Trigger {
    name: String,
    condition: Box<dyn FnMut() -> bool>,
    last: bool,
    bindings: Vec<Binding>,
}

fn factory<A: Action + 'static>(mut make: impl FnMut() -> A + 'static) -> Factory {
    Box::new(move || Box::new(make()) as Box<dyn Action>)
}

impl Trigger {
    pub fn new(name: impl Into<String>, condition: impl FnMut() -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            condition: Box::new(condition),
            last: false,
            bindings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schedule a fresh action on every rising edge.
    pub fn on_true<A: Action + 'static>(mut self, make: impl FnMut() -> A + 'static) -> Self {
        self.bindings.push(Binding::OnTrue(factory(make)));
        self
    }

    /// Schedule a fresh action on every falling edge.
    pub fn on_false<A: Action + 'static>(mut self, make: impl FnMut() -> A + 'static) -> Self {
        self.bindings.push(Binding::OnFalse(factory(make)));
        self
    }

    /// Schedule on the rising edge, cancel on the falling edge.
    pub fn while_true<A: Action + 'static>(mut self, make: impl FnMut() -> A + 'static) -> Self {
        self.bindings.push(Binding::WhileTrue {
            factory: factory(make),
            running: None,
        });
        self
    }

    /// Take the initial sample.
    pub(crate) fn seed(&mut self) {
        self.last = (self.condition)();
    }

    /// Sample the condition and fire edge bindings.
    pub(crate) fn poll(&mut self, scheduler: &mut Scheduler) {
        let now = (self.condition)();
        let rising = now && !self.last;
        let falling = !now && self.last;
        self.last = now;
        if !rising && !falling {
            return;
        }

        for binding in &mut self.bindings {
            match binding {
                Binding::OnTrue(make) if rising => {
                    schedule_from(scheduler, &self.name, make);
                }
                Binding::OnFalse(make) if falling => {
                    schedule_from(scheduler, &self.name, make);
                }
                Binding::WhileTrue { factory: make, running } => {
                    if rising {
                        *running = schedule_from(scheduler, &self.name, make);
                    } else if let Some(id) = running.take() {
                        scheduler.cancel(id);
                    }
                }
                _ => {}
            }
        }
    }
}

fn schedule_from(scheduler: &mut Scheduler, trigger: &str, make: &mut Factory) -> Option<ActionId> {
    match scheduler.schedule_boxed(make()) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(trigger, error = %e, "triggered action not scheduled");
            None
        }
    }
}
