//! Integration test: tick phases and trigger bindings.

use std::cell::Cell;
use std::rc::Rc;

use helm_control::scheduler::{ActionExt, Scheduler, Trigger, WaitUntil};
use helm_control::state::{Handle, Subsystem};

use super::support::{Arm, ArmState, context};

fn flag() -> (Rc<Cell<bool>>, impl FnMut() -> bool + 'static) {
    let flag = Rc::new(Cell::new(false));
    let read = Rc::clone(&flag);
    (flag, move || read.get())
}

#[test]
fn registered_subsystems_refresh_once_per_tick() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    scheduler.register(&arm);
    scheduler.register(&arm);

    for _ in 0..4 {
        scheduler.run_tick();
    }
    assert_eq!(arm.borrow().updates, 4);
    assert_eq!(scheduler.tick_count(), 4);
}

#[test]
fn while_true_holds_override_for_window() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    let (held, condition) = flag();
    let target = arm.clone();
    scheduler.bind(
        Trigger::new("hold manual", condition)
            .while_true(move || target.override_state(ArmState::Manual)),
    );

    scheduler.run_tick();
    assert!(!arm.is_overridden());

    held.set(true);
    scheduler.run_tick();
    assert_eq!(arm.state(), ArmState::Manual);
    arm.set_state(ArmState::Extended);
    scheduler.run_tick();
    assert_eq!(arm.state(), ArmState::Manual);
    assert_eq!(scheduler.len(), 1);

    held.set(false);
    scheduler.run_tick();
    assert!(!arm.is_overridden());
    assert_eq!(arm.state(), ArmState::Extended);
    assert!(scheduler.is_empty());
}

#[test]
fn condition_true_at_bind_waits_for_next_edge() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    let (pressed, condition) = flag();
    pressed.set(true);
    let target = arm.clone();
    scheduler.bind(
        Trigger::new("press", condition).on_true(move || target.override_state(ArmState::Manual)),
    );

    scheduler.run_tick();
    scheduler.run_tick();
    assert!(!arm.is_overridden());

    pressed.set(false);
    scheduler.run_tick();
    pressed.set(true);
    scheduler.run_tick();
    assert!(arm.is_overridden());
}

#[test]
fn on_false_fires_on_release() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    let (pressed, condition) = flag();
    let target = arm.clone();
    scheduler.bind(
        Trigger::new("release", condition).on_false(move || target.override_goal(true)),
    );

    pressed.set(true);
    scheduler.run_tick();
    assert_eq!(arm.borrow().machine().goal_override(), None);

    pressed.set(false);
    scheduler.run_tick();
    assert_eq!(arm.borrow().machine().goal_override(), Some(true));
}

#[test]
fn race_bounds_override_window() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    let done = Rc::new(Cell::new(false));
    let watch = Rc::clone(&done);

    arm.set_state(ArmState::Extended);
    let id = scheduler
        .schedule(
            arm.override_state(ArmState::Stowed)
                .race_with(WaitUntil::new(move || watch.get())),
        )
        .unwrap();
    scheduler.run_tick();
    assert_eq!(arm.state(), ArmState::Stowed);

    done.set(true);
    scheduler.run_tick();
    assert!(!scheduler.is_scheduled(id));
    assert!(!arm.is_overridden());
    assert_eq!(arm.state(), ArmState::Extended);
}

#[test]
fn wait_for_finishes_on_state() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    let id = scheduler.schedule(arm.wait_for(ArmState::Extended)).unwrap();

    scheduler.run_tick();
    assert!(scheduler.is_scheduled(id));

    arm.set_state(ArmState::Extended);
    scheduler.run_tick();
    assert!(!scheduler.is_scheduled(id));
}

#[test]
fn cancel_all_releases_everything() {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let mut scheduler = Scheduler::new();
    arm.set_state(ArmState::Extended);
    scheduler.schedule(arm.override_state(ArmState::Manual)).unwrap();
    scheduler.schedule(arm.override_goal(false)).unwrap();

    scheduler.cancel_all();
    assert!(scheduler.is_empty());
    assert_eq!(arm.state(), ArmState::Extended);
    assert_eq!(arm.borrow().machine().goal_override(), None);
}
