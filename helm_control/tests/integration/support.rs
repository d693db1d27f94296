//! Shared fixtures: a goal-overridable arm and a manual-clock context.

use std::rc::Rc;

use helm_common::prelude::*;
use helm_control::state::{GoalReporting, MachineContext, StateMachine, Subsystem};

helm_control::state_variants! {
    /// Arm angles [rad].
    pub enum ArmState {
        Stowed => 0.0,
        Extended => 1.0,
        Manual,
    }
}

pub fn context() -> (Rc<ManualClock>, Rc<MemorySink>, MachineContext) {
    let clock = Rc::new(ManualClock::default());
    let sink = Rc::new(MemorySink::new());
    let ctx = MachineContext::new(clock.clone(), sink.clone());
    (clock, sink, ctx)
}

/// Records every `transition()` and counts refreshes.
pub struct Arm {
    pub machine: StateMachine<ArmState>,
    pub transitions: Vec<ArmState>,
    pub updates: usize,
    pub on_target: bool,
}

impl Arm {
    pub const NAME: &'static str = "Arm";

    pub fn new(ctx: &MachineContext) -> Self {
        Self::with_machine(StateMachine::goal_overridable(Self::NAME, ArmState::Stowed, ctx))
    }

    /// Arm without any override capability.
    pub fn base(ctx: &MachineContext) -> Self {
        Self::with_machine(StateMachine::new(Self::NAME, ArmState::Stowed, ctx))
    }

    fn with_machine(machine: StateMachine<ArmState>) -> Self {
        Self {
            machine,
            transitions: Vec::new(),
            updates: 0,
            on_target: false,
        }
    }
}

impl Subsystem for Arm {
    type State = ArmState;

    fn machine(&self) -> &StateMachine<ArmState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<ArmState> {
        &mut self.machine
    }

    fn transition(&mut self) {
        let state = self.state();
        self.transitions.push(state);
    }

    fn update(&mut self) {
        self.updates += 1;
    }
}

impl GoalReporting for Arm {
    fn evaluate_goal(&self) -> bool {
        self.on_target
    }
}
