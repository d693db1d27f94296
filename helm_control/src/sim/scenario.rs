//! Scripted scenario over the simulated machine.
//!
//! Config events become triggers on the tick counter: requests schedule a
//! one-shot coordinator command, override windows hold an override action
//! with `while_true`, tuning events edit the tuning store.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use helm_common::clock::{ManualClock, MonotonicClock};
use helm_common::telemetry::{TelemetrySink, TracingSink};
use helm_common::tuning::Tuning;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ControlConfig, SimEvent};
use crate::cycle::{Pacing, TickLoop, TickStats};
use crate::error::ControlError;
use crate::scheduler::compose::RunOnce;
use crate::scheduler::ownership::Claim;
use crate::scheduler::runner::Scheduler;
use crate::scheduler::trigger::Trigger;
use crate::state::handle::Handle;
use crate::state::machine::MachineContext;
use crate::state::subsystem::{GoalReporting, Subsystem};
use crate::state::tunables::tunable_map;
use crate::state::variant::StateVariant;

use super::elevator::{Elevator, ElevatorState};
use super::intake::{Intake, IntakeState};
use super::superstructure::{Superstructure, SuperstructureState};

/// One observed state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub tick: u64,
    pub subsystem: String,
    pub from: String,
    pub to: String,
}

/// End-of-run view of one subsystem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsystemSnapshot {
    pub state: String,
    pub managed: String,
    pub overridden: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub service: String,
    pub ticks: u64,
    pub elevator_position: f64,
    pub elevator_at_goal: bool,
    pub subsystems: BTreeMap<String, SubsystemSnapshot>,
    pub changes: Vec<StateChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TickStats>,
}

impl ScenarioReport {
    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ControlError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

pub struct Scenario {
    service: String,
    scheduler: Scheduler,
    tick: Rc<Cell<u64>>,
    tuning: Rc<Tuning>,
    elevator: Handle<Elevator>,
    intake: Handle<Intake>,
    superstructure: Handle<Superstructure>,
    last: [&'static str; 3],
    changes: Vec<StateChange>,
}

impl Scenario {
    /// Wire subsystems, triggers and tunables from `config`.
    pub fn build(config: &ControlConfig, ctx: &MachineContext) -> Result<Self, ControlError> {
        let tuning = Tuning::new(config.tuning.enabled);
        tuning.attach(Rc::clone(&ctx.sink));
        for (key, value) in &config.tuning.values {
            tuning.set_live(key, *value);
        }

        let elevator_config = &config.sim.elevator;
        let elevator = match &elevator_config.tuned_states {
            Some(names) => {
                let states = names
                    .iter()
                    .map(|name| parse::<ElevatorState>(name))
                    .collect::<Result<Vec<_>, _>>()?;
                let setpoints = tunable_map(&tuning, Elevator::SETPOINTS_KEY, &states)?;
                Elevator::with_setpoints(ctx, setpoints, elevator_config)
            }
            None => Elevator::new(ctx, &tuning, elevator_config),
        };
        let elevator = Handle::new(elevator);
        let intake = Handle::new(Intake::new(ctx, &config.sim.intake));
        let superstructure = Handle::new(Superstructure::new(ctx, elevator.clone(), intake.clone()));

        let mut scheduler = Scheduler::new();
        scheduler.register(&elevator);
        scheduler.register(&intake);
        scheduler.register(&superstructure);

        let tick = Rc::new(Cell::new(0));
        let mut scenario = Self {
            service: config.shared.service_name.clone(),
            scheduler,
            tick,
            tuning,
            last: [
                elevator.state().name(),
                intake.state().name(),
                superstructure.state().name(),
            ],
            elevator,
            intake,
            superstructure,
            changes: Vec::new(),
        };
        for event in &config.sim.events {
            scenario.bind_event(event)?;
        }
        info!(
            events = config.sim.events.len(),
            tuning = scenario.tuning.is_enabled(),
            "scenario built"
        );
        Ok(scenario)
    }

    fn bind_event(&mut self, event: &SimEvent) -> Result<(), ControlError> {
        let at = event.at_tick();
        let tick = Rc::clone(&self.tick);
        let trigger = match event {
            SimEvent::Request { state, .. } => {
                let state = parse::<SuperstructureState>(state)?;
                let target = self.superstructure.clone();
                Trigger::new(format!("request {state}"), tick_is(tick, at)).on_true(move || {
                    let claim = Claim::state(target.id());
                    let target = target.clone();
                    RunOnce::new(move || target.set_state(state)).requiring([claim])
                })
            }
            SimEvent::OverrideState {
                subsystem,
                state,
                until_tick,
                ..
            } => {
                let window = tick_within(tick, at, *until_tick);
                match subsystem.as_str() {
                    Elevator::NAME => {
                        let state = parse::<ElevatorState>(state)?;
                        let handle = self.elevator.clone();
                        Trigger::new(format!("override {subsystem}"), window)
                            .while_true(move || handle.override_state(state))
                    }
                    Intake::NAME => {
                        let state = parse::<IntakeState>(state)?;
                        let handle = self.intake.clone();
                        Trigger::new(format!("override {subsystem}"), window)
                            .while_true(move || handle.override_state(state))
                    }
                    other => return Err(ControlError::unknown("overridable subsystem", other)),
                }
            }
            SimEvent::OverrideGoal {
                subsystem,
                value,
                until_tick,
                ..
            } => {
                if subsystem != Elevator::NAME {
                    return Err(ControlError::unknown("goal-overridable subsystem", subsystem));
                }
                let value = *value;
                let handle = self.elevator.clone();
                let window = tick_within(tick, at, *until_tick);
                Trigger::new(format!("goal override {subsystem}"), window).while_true(move || handle.override_goal(value))
            }
            SimEvent::Tuning { enabled, .. } => {
                let enabled = *enabled;
                let tuning = Rc::clone(&self.tuning);
                Trigger::new("tuning mode", tick_is(tick, at)).on_true(move || {
                    let tuning = Rc::clone(&tuning);
                    RunOnce::new(move || tuning.set_enabled(enabled))
                })
            }
            SimEvent::SetLive { key, value, .. } => {
                let (key, value) = (key.clone(), *value);
                let tuning = Rc::clone(&self.tuning);
                Trigger::new(format!("set {key}"), tick_is(tick, at)).on_true(move || {
                    let (tuning, key) = (Rc::clone(&tuning), key.clone());
                    RunOnce::new(move || tuning.set_live(&key, value))
                })
            }
        };
        self.scheduler.bind(trigger);
        Ok(())
    }

    /// Advance one tick: apply tuning-mode changes, then run the scheduler.
    pub fn step(&mut self) {
        self.tick.set(self.tick.get() + 1);
        self.tuning.refresh();
        self.scheduler.run_tick();
        self.record_changes();
    }

    fn record_changes(&mut self) {
        let tick = self.tick.get();
        let current = [
            (Elevator::NAME, self.elevator.state().name()),
            (Intake::NAME, self.intake.state().name()),
            (Superstructure::NAME, self.superstructure.state().name()),
        ];
        for (last, (subsystem, now)) in self.last.iter_mut().zip(current) {
            if *last != now {
                debug!(tick, subsystem, from = *last, to = now, "observed change");
                self.changes.push(StateChange {
                    tick,
                    subsystem: subsystem.to_string(),
                    from: last.to_string(),
                    to: now.to_string(),
                });
                *last = now;
            }
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick.get()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn tuning(&self) -> &Rc<Tuning> {
        &self.tuning
    }

    pub fn elevator(&self) -> &Handle<Elevator> {
        &self.elevator
    }

    pub fn intake(&self) -> &Handle<Intake> {
        &self.intake
    }

    pub fn superstructure(&self) -> &Handle<Superstructure> {
        &self.superstructure
    }

    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    pub fn report(&self) -> ScenarioReport {
        let mut subsystems = BTreeMap::new();
        subsystems.insert(Elevator::NAME.to_string(), snapshot(&self.elevator));
        subsystems.insert(Intake::NAME.to_string(), snapshot(&self.intake));
        subsystems.insert(Superstructure::NAME.to_string(), snapshot(&self.superstructure));

        let elevator = self.elevator.borrow();
        ScenarioReport {
            service: self.service.clone(),
            ticks: self.tick.get(),
            elevator_position: elevator.position(),
            elevator_at_goal: elevator.at_goal(),
            subsystems,
            changes: self.changes.clone(),
            timing: None,
        }
    }
}

fn tick_is(tick: Rc<Cell<u64>>, at: u64) -> impl FnMut() -> bool {
    move || tick.get() == at
}

fn tick_within(tick: Rc<Cell<u64>>, from: u64, until: u64) -> impl FnMut() -> bool {
    move || (from..until).contains(&tick.get())
}

fn parse<S: StateVariant>(name: &str) -> Result<S, ControlError> {
    S::from_name(name).ok_or_else(|| ControlError::unknown("state", name))
}

fn snapshot<T: Subsystem>(handle: &Handle<T>) -> SubsystemSnapshot {
    let subsystem = handle.borrow();
    let machine = subsystem.machine();
    SubsystemSnapshot {
        state: machine.state().name().to_string(),
        managed: machine.managed_state().name().to_string(),
        overridden: machine.override_active(),
    }
}

/// Build and run the configured scenario to completion.
///
/// Simulated pacing drives a [`ManualClock`] one period per tick; real-time
/// pacing reads a [`MonotonicClock`] and sleeps between ticks.
pub fn run(
    config: &ControlConfig,
    pacing: Pacing,
    running: &AtomicBool,
) -> Result<ScenarioReport, ControlError> {
    let sink: Rc<dyn TelemetrySink> = Rc::new(TracingSink);
    let period = config.tick.period();
    let mut tick_loop = TickLoop::new(period, pacing);

    let mut scenario = match pacing {
        Pacing::Simulated => {
            let clock = Rc::new(ManualClock::default());
            let ctx = MachineContext::new(clock.clone(), sink);
            let mut scenario = Scenario::build(config, &ctx)?;
            tick_loop.run(config.tick.ticks, running, || {
                clock.advance(period.as_secs_f64());
                scenario.step();
            });
            scenario
        }
        Pacing::RealTime => {
            let ctx = MachineContext::new(Rc::new(MonotonicClock::new()), sink);
            let mut scenario = Scenario::build(config, &ctx)?;
            tick_loop.run(config.tick.ticks, running, || scenario.step());
            scenario
        }
    };

    scenario.scheduler.cancel_all();
    let mut report = scenario.report();
    report.timing = Some(tick_loop.stats().clone());
    info!(
        ticks = report.ticks,
        changes = report.changes.len(),
        avg_tick_ns = tick_loop.stats().avg_tick_ns(),
        "scenario complete"
    );
    Ok(report)
}
