//! Simulated elevator: goal-overridable, tunable height setpoints.
//!
//! The carriage follows a speed-limited first-order response toward the goal
//! height of the current state. Setpoints come from a state-to-tunable table,
//! so live edits move the goal while the state is held.

use std::collections::HashMap;
use std::rc::Rc;

use helm_common::tuning::{TunableNumber, Tuning};

use crate::config::ElevatorConfig;
use crate::state::machine::{MachineContext, StateMachine};
use crate::state::subsystem::{GoalReporting, Subsystem};
use crate::state::tunables::tunable_map_all;
use crate::state::variant::StateVariant;

crate::state_variants! {
    /// Carriage heights [m].
    pub enum ElevatorState {
        Stow => 0.0,
        Intake => 0.15,
        Climb => 0.6,
        Score => 1.2,
        /// Hold wherever the carriage is.
        Manual,
    }
}

/// Change-detection caller id for setpoint tunables.
const SETPOINT_WATCHER: u64 = 1;

pub struct Elevator {
    machine: StateMachine<ElevatorState>,
    setpoints: HashMap<ElevatorState, Rc<TunableNumber>>,
    config: ElevatorConfig,
    position: f64,
    goal: f64,
    last_step: f64,
}

impl Elevator {
    pub const NAME: &'static str = "Elevator";

    /// Key under which setpoint tunables are published.
    pub const SETPOINTS_KEY: &'static str = "Elevator/Setpoints";

    /// Elevator with every setpoint tunable.
    pub fn new(ctx: &MachineContext, tuning: &Rc<Tuning>, config: &ElevatorConfig) -> Self {
        Self::with_setpoints(ctx, tunable_map_all(tuning, Self::SETPOINTS_KEY), config)
    }

    /// Elevator over a prepared setpoint table. States missing from the
    /// table use their fixed setpoint.
    pub fn with_setpoints(
        ctx: &MachineContext,
        setpoints: HashMap<ElevatorState, Rc<TunableNumber>>,
        config: &ElevatorConfig,
    ) -> Self {
        Self {
            machine: StateMachine::goal_overridable(Self::NAME, ElevatorState::Stow, ctx),
            setpoints,
            config: config.clone(),
            position: config.start_position,
            goal: config.start_position,
            last_step: ctx.clock.now(),
        }
    }

    /// Carriage height [m].
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Height the carriage is driving toward [m].
    pub fn goal(&self) -> f64 {
        self.goal
    }

    fn setpoint(&self, state: ElevatorState) -> Option<f64> {
        self.setpoints
            .get(&state)
            .map(|n| n.get())
            .or_else(|| state.setpoint())
    }

    /// Advance the carriage by the clock time elapsed since the last step.
    fn step_plant(&mut self) {
        let now = self.machine.clock().now();
        let dt = (now - self.last_step).max(0.0);
        self.last_step = now;

        let limit = self.config.max_speed * dt;
        let step = (self.config.kp * (self.goal - self.position) * dt).clamp(-limit, limit);
        self.position += step;
        self.machine.telemetry().record("Position", self.position);
    }
}

impl Subsystem for Elevator {
    type State = ElevatorState;

    fn machine(&self) -> &StateMachine<ElevatorState> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<ElevatorState> {
        &mut self.machine
    }

    fn transition(&mut self) {
        self.goal = match self.state() {
            ElevatorState::Manual => self.position,
            state => self.setpoint(state).unwrap_or(self.goal),
        };
        self.machine.telemetry().record("Goal", self.goal);
    }

    fn update(&mut self) {
        let state = self.state();
        if let Some(number) = self.setpoints.get(&state) {
            if number.has_changed(SETPOINT_WATCHER) {
                self.goal = number.get();
                self.machine.telemetry().record("Goal", self.goal);
            }
        }
        self.step_plant();
    }
}

impl GoalReporting for Elevator {
    fn evaluate_goal(&self) -> bool {
        (self.goal - self.position).abs() <= self.config.tolerance
    }
}
