//! Integration test: state override engage, hold and release.
//!
//! Validates: forced state applies immediately, requests during the
//! override only move the managed state, and release restores the latest
//! managed state through `transition()`.

use helm_common::prelude::*;
use helm_control::scheduler::Scheduler;
use helm_control::state::machine::fields;
use helm_control::state::{Handle, Subsystem};

use super::support::{Arm, ArmState, context};

#[test]
fn override_holds_and_restores_latest_request() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    scheduler.register(&arm);

    arm.set_state(ArmState::Extended);
    let id = scheduler.schedule(arm.override_state(ArmState::Manual)).unwrap();
    assert_eq!(arm.state(), ArmState::Manual);
    assert_eq!(arm.managed_state(), ArmState::Extended);
    assert!(arm.is_overridden());

    arm.set_state(ArmState::Stowed);
    assert_eq!(arm.state(), ArmState::Manual);
    assert_eq!(arm.managed_state(), ArmState::Stowed);

    for _ in 0..3 {
        scheduler.run_tick();
    }
    assert!(scheduler.is_scheduled(id));
    assert_eq!(arm.state(), ArmState::Manual);

    assert!(scheduler.cancel(id));
    assert_eq!(arm.state(), ArmState::Stowed);
    assert!(!arm.is_overridden());
    assert_eq!(
        arm.borrow().transitions,
        vec![ArmState::Extended, ArmState::Manual, ArmState::Stowed]
    );
}

#[test]
fn restore_runs_transition_for_unchanged_state() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();

    let id = scheduler.schedule(arm.override_state(ArmState::Stowed)).unwrap();
    scheduler.cancel(id);
    assert_eq!(arm.state(), ArmState::Stowed);
    assert_eq!(arm.borrow().transitions, vec![ArmState::Stowed, ArmState::Stowed]);
}

#[test]
fn telemetry_tracks_override_lifecycle() {
    let (_, sink, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    let key = |field: &str| format!("{}/{field}", Arm::NAME);

    arm.set_state(ArmState::Extended);
    let id = scheduler.schedule(arm.override_state(ArmState::Manual)).unwrap();
    assert_eq!(
        sink.latest(&key(fields::STATE_OVERRIDE)),
        Some(TelemetryValue::Bool(true))
    );
    assert_eq!(
        sink.latest(&key(fields::CURRENT_STATE)),
        Some(TelemetryValue::Text("Manual".into()))
    );
    assert_eq!(
        sink.latest(&key(fields::MANAGED_STATE)),
        Some(TelemetryValue::Text("Extended".into()))
    );

    scheduler.cancel(id);
    assert_eq!(
        sink.latest(&key(fields::STATE_OVERRIDE)),
        Some(TelemetryValue::Bool(false))
    );
    assert_eq!(
        sink.latest(&key(fields::CURRENT_STATE)),
        Some(TelemetryValue::Text("Extended".into()))
    );
}

#[test]
fn timestamp_moves_only_on_change() {
    let (clock, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();

    clock.advance(1.0);
    arm.set_state(ArmState::Extended);
    assert_eq!(arm.borrow().machine().last_state_change_timestamp(), 1.0);

    clock.advance(1.0);
    arm.set_state(ArmState::Extended);
    assert_eq!(arm.borrow().machine().last_state_change_timestamp(), 1.0);
    assert_eq!(arm.borrow().transitions.len(), 2);

    clock.advance(1.0);
    scheduler.schedule(arm.override_state(ArmState::Manual)).unwrap();
    assert_eq!(arm.borrow().machine().last_state_change_timestamp(), 3.0);
    assert!(!arm.borrow().timeout(0.5));
    clock.advance(1.0);
    assert!(arm.borrow().timeout(0.5));
}

#[test]
fn override_on_base_machine_is_inert() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::base(&ctx));
    let mut scheduler = Scheduler::new();

    arm.set_state(ArmState::Extended);
    let id = scheduler.schedule(arm.override_state(ArmState::Manual)).unwrap();
    assert_eq!(arm.state(), ArmState::Extended);
    assert!(!arm.is_overridden());

    scheduler.cancel(id);
    assert_eq!(arm.state(), ArmState::Extended);
    assert_eq!(arm.borrow().transitions, vec![ArmState::Extended]);
}

#[test]
fn goal_override_masks_evaluation() {
    use helm_control::state::GoalReporting;

    let (_, sink, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    assert!(!arm.borrow().at_goal());

    let id = scheduler.schedule(arm.override_goal(true)).unwrap();
    assert!(arm.borrow().at_goal());
    assert_eq!(
        sink.latest("Arm/GoalOverrideValue"),
        Some(TelemetryValue::Bool(true))
    );

    scheduler.cancel(id);
    assert!(!arm.borrow().at_goal());
    arm.borrow_mut().on_target = true;
    assert!(arm.borrow().at_goal());
    assert_eq!(
        sink.latest("Arm/GoalOverrideActive"),
        Some(TelemetryValue::Bool(false))
    );
}
