//! Simulated roller intake: overridable, self-chaining timed states.
//!
//! `Intaking` senses a game piece after `intake_time` and chains to
//! `Holding`; `Ejecting` drops the piece after `eject_time` and chains to
//! `Idle`. Both chains go through `set_state`, so while an override holds the
//! intake they only move the managed state.

use crate::config::IntakeConfig;
use crate::state::machine::{MachineContext, StateMachine};
use crate::state::subsystem::Subsystem;
use crate::state::variant::StateVariant;

crate::state_variants! {
    /// Roller duty cycle per state.
    pub enum IntakeState {
        Idle => 0.0,
        Intaking => 0.8,
        Holding => 0.1,
        Ejecting => -1.0,
    }
}

pub struct Intake {
    machine: StateMachine<IntakeState>,
    config: IntakeConfig,
    roller: f64,
    has_piece: bool,
}

impl Intake {
    pub const NAME: &'static str = "Intake";

    pub fn new(ctx: &MachineContext, config: &IntakeConfig) -> Self {
        Self {
            machine: StateMachine::overridable(Self::NAME, IntakeState::Idle, ctx),
            config: config.clone(),
            roller: 0.0,
            has_piece: false,
        }
    }

    /// Roller duty cycle in `[-1, 1]`.
    pub fn roller(&self) -> f64 {
        self.roller
    }

    pub fn has_piece(&self) -> bool {
        self.has_piece
    }
}

impl Subsystem for Intake {
    type State = IntakeState;

    fn machine(&self) -> &StateMachine<IntakeState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<IntakeState> {
        &mut self.machine
    }

    fn transition(&mut self) {
        self.roller = self.state().setpoint().unwrap_or(0.0);
        self.machine.telemetry().record("Roller", self.roller);
    }

    fn update(&mut self) {
        match self.state() {
            IntakeState::Intaking if self.timeout(self.config.intake_time) => {
                self.has_piece = true;
                self.machine.telemetry().record("HasPiece", true);
                self.set_state(IntakeState::Holding);
            }
            IntakeState::Ejecting if self.timeout(self.config.eject_time) => {
                self.has_piece = false;
                self.machine.telemetry().record("HasPiece", false);
                self.set_state(IntakeState::Idle);
            }
            _ => {}
        }
    }
}
