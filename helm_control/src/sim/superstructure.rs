//! Superstructure coordinator over the elevator and intake.

use crate::coordinator::Coordinator;
use crate::state::handle::Handle;
use crate::state::machine::{MachineContext, StateMachine};
use crate::state::subsystem::{GoalReporting, Subsystem};

use super::elevator::{Elevator, ElevatorState};
use super::intake::{Intake, IntakeState};

crate::state_variants! {
    pub enum SuperstructureState {
        Idle,
        Intaking,
        Stowed,
        Scoring,
    }
}

pub struct Superstructure {
    coordinator: Coordinator<SuperstructureState>,
    elevator: Handle<Elevator>,
    intake: Handle<Intake>,
    ejecting: bool,
}

impl Superstructure {
    pub const NAME: &'static str = "Superstructure";

    pub fn new(ctx: &MachineContext, elevator: Handle<Elevator>, intake: Handle<Intake>) -> Self {
        Self {
            coordinator: Coordinator::new(Self::NAME, SuperstructureState::Idle, ctx),
            elevator,
            intake,
            ejecting: false,
        }
    }
}

impl Subsystem for Superstructure {
    type State = SuperstructureState;

    fn machine(&self) -> &StateMachine<SuperstructureState> {
        self.coordinator.machine()
    }

    fn machine_mut(&mut self) -> &mut StateMachine<SuperstructureState> {
        self.coordinator.machine_mut()
    }

    fn transition(&mut self) {
        let (elevator, intake) = match self.state() {
            SuperstructureState::Idle => (ElevatorState::Stow, IntakeState::Idle),
            SuperstructureState::Intaking => (ElevatorState::Intake, IntakeState::Intaking),
            SuperstructureState::Stowed => (ElevatorState::Stow, IntakeState::Holding),
            SuperstructureState::Scoring => (ElevatorState::Score, IntakeState::Holding),
        };
        self.ejecting = false;
        let commander = self.coordinator.commander();
        commander.command_subsystem(&self.elevator, elevator);
        commander.command_subsystem(&self.intake, intake);
    }

    fn update(&mut self) {
        match self.state() {
            SuperstructureState::Intaking if self.intake.state() == IntakeState::Holding => {
                self.set_state(SuperstructureState::Stowed);
            }
            SuperstructureState::Scoring if !self.ejecting => {
                let ready = self.elevator.borrow().at_goal();
                if ready && self.intake.borrow().has_piece() {
                    self.coordinator
                        .command_subsystem(&self.intake, IntakeState::Ejecting);
                    self.ejecting = true;
                }
            }
            SuperstructureState::Scoring if self.intake.managed_state() == IntakeState::Idle => {
                self.set_state(SuperstructureState::Idle);
            }
            _ => {}
        }
    }
}
