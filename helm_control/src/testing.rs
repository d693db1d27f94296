//! Unit-test fixtures.

use std::rc::Rc;

use helm_common::clock::ManualClock;
use helm_common::telemetry::MemorySink;

use crate::state::machine::{MachineContext, StateMachine};
use crate::state::subsystem::{GoalReporting, Subsystem};

crate::state_variants! {
    pub enum ProbeState {
        Idle => 0.0,
        Busy => 1.0,
        Fault,
    }
}

pub fn context() -> (Rc<ManualClock>, Rc<MemorySink>, MachineContext) {
    let clock = Rc::new(ManualClock::default());
    let sink = Rc::new(MemorySink::new());
    let ctx = MachineContext::new(clock.clone(), sink.clone());
    (clock, sink, ctx)
}

/// Subsystem counting `transition()` calls.
#[derive(Debug)]
pub struct Probe {
    pub machine: StateMachine<ProbeState>,
    pub transitions: usize,
    pub goal: bool,
}

impl Probe {
    pub fn new(machine: StateMachine<ProbeState>) -> Self {
        Self {
            machine,
            transitions: 0,
            goal: false,
        }
    }

    pub fn base() -> Self {
        Self::new(StateMachine::new("Probe", ProbeState::Idle, &context().2))
    }

    pub fn overridable() -> Self {
        Self::new(StateMachine::overridable("Probe", ProbeState::Idle, &context().2))
    }

    pub fn goal_overridable() -> Self {
        Self::new(StateMachine::goal_overridable(
            "Probe",
            ProbeState::Idle,
            &context().2,
        ))
    }
}

impl Subsystem for Probe {
    type State = ProbeState;

    fn machine(&self) -> &StateMachine<ProbeState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<ProbeState> {
        &mut self.machine
    }

    fn transition(&mut self) {
        self.transitions += 1;
    }
}

impl GoalReporting for Probe {
    fn evaluate_goal(&self) -> bool {
        self.goal
    }
}
