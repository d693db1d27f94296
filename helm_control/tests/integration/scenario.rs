//! Integration test: scripted simulation scenarios.
//!
//! Validates: config events become triggers, override windows open and
//! close on the configured ticks, live tunables move the elevator, and the
//! full run produces a serializable report.

use std::sync::atomic::AtomicBool;

use helm_common::clock::ManualClock;
use helm_control::config::{ControlConfig, load_config_from_str};
use helm_control::cycle::Pacing;
use helm_control::sim::{self, IntakeState, Scenario, SuperstructureState};
use helm_control::state::{GoalReporting, MachineContext};

use super::support::context;

fn config(body: &str) -> ControlConfig {
    load_config_from_str(&format!("[shared]\nservice_name = \"helm-it\"\n{body}")).unwrap()
}

fn run_to(scenario: &mut Scenario, clock: &ManualClock, tick: u64) {
    while scenario.tick() < tick {
        clock.advance(0.02);
        scenario.step();
    }
}

fn build(body: &str) -> (std::rc::Rc<ManualClock>, Scenario) {
    let (clock, _, ctx): (_, _, MachineContext) = context();
    let scenario = Scenario::build(&config(body), &ctx).unwrap();
    (clock, scenario)
}

#[test]
fn override_window_opens_and_closes() {
    let (clock, mut scenario) = build(
        r#"
[[sim.events]]
kind = "override_state"
subsystem = "Intake"
state = "Ejecting"
at_tick = 5
until_tick = 10
"#,
    );

    run_to(&mut scenario, &clock, 4);
    assert!(!scenario.intake().is_overridden());

    run_to(&mut scenario, &clock, 7);
    assert!(scenario.intake().is_overridden());
    assert_eq!(scenario.intake().state(), IntakeState::Ejecting);
    assert_eq!(scenario.intake().borrow().roller(), -1.0);

    run_to(&mut scenario, &clock, 10);
    assert!(!scenario.intake().is_overridden());
    assert_eq!(scenario.intake().state(), IntakeState::Idle);
    assert!(scenario.scheduler().is_empty());
}

#[test]
fn goal_override_window() {
    let (clock, mut scenario) = build(
        r#"
[[sim.events]]
kind = "override_goal"
subsystem = "Elevator"
value = false
at_tick = 3
until_tick = 6
"#,
    );

    run_to(&mut scenario, &clock, 2);
    assert!(scenario.elevator().borrow().at_goal());
    run_to(&mut scenario, &clock, 4);
    assert!(!scenario.elevator().borrow().at_goal());
    run_to(&mut scenario, &clock, 7);
    assert!(scenario.elevator().borrow().at_goal());
}

#[test]
fn intake_cycle_stows_superstructure() {
    let (clock, mut scenario) = build(
        r#"
[[sim.events]]
kind = "request"
at_tick = 2
state = "Intaking"
"#,
    );

    run_to(&mut scenario, &clock, 10);
    assert_eq!(scenario.superstructure().state(), SuperstructureState::Intaking);

    run_to(&mut scenario, &clock, 60);
    assert_eq!(scenario.superstructure().state(), SuperstructureState::Stowed);
    assert_eq!(scenario.intake().state(), IntakeState::Holding);
    assert!(scenario.intake().borrow().has_piece());
}

#[test]
fn intake_override_defers_superstructure_command() {
    let (clock, mut scenario) = build(
        r#"
[[sim.events]]
kind = "override_state"
subsystem = "Intake"
state = "Idle"
at_tick = 1
until_tick = 20

[[sim.events]]
kind = "request"
at_tick = 5
state = "Intaking"
"#,
    );

    run_to(&mut scenario, &clock, 10);
    assert_eq!(scenario.intake().state(), IntakeState::Idle);
    assert_eq!(scenario.intake().managed_state(), IntakeState::Intaking);

    run_to(&mut scenario, &clock, 20);
    assert_eq!(scenario.intake().state(), IntakeState::Intaking);
}

#[test]
fn live_setpoint_moves_elevator() {
    let (clock, mut scenario) = build(
        r#"
[tuning]
enabled = true
values = { "Elevator/Setpoints/Stow" = 0.1 }

[[sim.events]]
kind = "set_live"
at_tick = 100
key = "Elevator/Setpoints/Stow"
value = 0.3
"#,
    );

    run_to(&mut scenario, &clock, 99);
    assert!((scenario.elevator().borrow().position() - 0.1).abs() < 0.02);

    run_to(&mut scenario, &clock, 250);
    assert!((scenario.elevator().borrow().position() - 0.3).abs() < 0.02);
}

#[test]
fn tuning_event_freezes_values() {
    let (clock, mut scenario) = build(
        r#"
[tuning]
enabled = true

[[sim.events]]
kind = "tuning"
at_tick = 3
enabled = false
"#,
    );

    run_to(&mut scenario, &clock, 3);
    assert!(scenario.tuning().is_enabled());
    run_to(&mut scenario, &clock, 4);
    assert!(!scenario.tuning().is_enabled());
}

#[test]
fn full_run_report_serializes() {
    let config = config(
        r#"
[tick]
ticks = 200

[[sim.events]]
kind = "request"
at_tick = 2
state = "Intaking"

[[sim.events]]
kind = "request"
at_tick = 60
state = "Scoring"
"#,
    );
    let running = AtomicBool::new(true);
    let report = sim::run(&config, Pacing::Simulated, &running).unwrap();

    assert_eq!(report.ticks, 200);
    assert_eq!(report.subsystems["Superstructure"].state, "Idle");
    assert_eq!(report.subsystems["Intake"].state, "Idle");
    assert!(!report.subsystems["Intake"].overridden);
    assert!(
        report
            .changes
            .iter()
            .any(|c| c.subsystem == "Superstructure" && c.to == "Scoring")
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["service"], "helm-it");
    assert_eq!(json["timing"]["tick_count"], 200);
}

#[test]
fn sample_config_runs() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/helm.toml");
    let config = helm_control::config::load_config(&path).unwrap();
    let running = AtomicBool::new(true);
    let report = sim::run(&config, Pacing::Simulated, &running).unwrap();
    assert_eq!(report.ticks, config.tick.ticks);
    assert!(report.subsystems.values().all(|s| !s.overridden));
}
