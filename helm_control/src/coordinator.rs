//! Coordinators: state machines over coordinator-level states that command
//! other subsystems.
//!
//! A coordinator holds no subsystem state. Its `transition()` issues
//! `set_state` requests through the [`Commander`], and those requests land as
//! managed state on overridable subsystems. An override seizes a subsystem
//! by claiming it directly; the coordinator keeps commanding, unaware, and its
//! latest request is applied once the override ends.

use helm_common::telemetry::Telemetry;
use tracing::trace;

use crate::state::handle::Handle;
use crate::state::machine::{MachineContext, StateMachine};
use crate::state::subsystem::Subsystem;
use crate::state::variant::StateVariant;

/// Permission to command subsystems. Only a [`Coordinator`] can hand one out.
#[derive(Debug)]
pub struct Commander {
    telemetry: Telemetry,
}

impl Commander {
    /// Request `state` on `subsystem`.
    pub fn command_subsystem<T: Subsystem>(&self, subsystem: &Handle<T>, state: T::State) {
        trace!(
            coordinator = self.telemetry.namespace(),
            subsystem = %subsystem.id(),
            state = state.name(),
            "command"
        );
        subsystem.borrow_mut().set_state(state);
    }
}

/// Coordinator machine plus its commanding capability.
#[derive(Debug)]
pub struct Coordinator<S: StateVariant> {
    machine: StateMachine<S>,
    commander: Commander,
}

impl<S: StateVariant> Coordinator<S> {
    pub fn new(name: &str, initial: S, ctx: &MachineContext) -> Self {
        Self::from_machine(StateMachine::new(name, initial, ctx))
    }

    /// Coordinator whose own state can be overridden.
    pub fn overridable(name: &str, initial: S, ctx: &MachineContext) -> Self {
        Self::from_machine(StateMachine::overridable(name, initial, ctx))
    }

    fn from_machine(machine: StateMachine<S>) -> Self {
        let commander = Commander {
            telemetry: machine.telemetry().clone(),
        };
        Self { machine, commander }
    }

    pub fn machine(&self) -> &StateMachine<S> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut StateMachine<S> {
        &mut self.machine
    }

    pub fn commander(&self) -> &Commander {
        &self.commander
    }

    /// Shorthand for `self.commander().command_subsystem(..)`.
    pub fn command_subsystem<T: Subsystem>(&self, subsystem: &Handle<T>, state: T::State) {
        self.commander.command_subsystem(subsystem, state);
    }
}
