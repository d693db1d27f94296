//! Integration test: coordinator commands under subsystem overrides.
//!
//! Validates: a coordinator keeps commanding an overridden subsystem, the
//! commands land as managed state, and the latest one applies on release.

use helm_control::coordinator::Coordinator;
use helm_control::scheduler::{Claim, RunOnce, Scheduler};
use helm_control::state::{Handle, MachineContext, StateMachine, Subsystem};

use super::support::{Arm, ArmState, context};

helm_control::state_variants! {
    enum CellState {
        Rest,
        Reach,
    }
}

struct Workcell {
    coordinator: Coordinator<CellState>,
    arm: Handle<Arm>,
    wrist: Handle<Arm>,
}

impl Workcell {
    fn new(ctx: &MachineContext, arm: Handle<Arm>, wrist: Handle<Arm>) -> Self {
        Self {
            coordinator: Coordinator::new("Workcell", CellState::Rest, ctx),
            arm,
            wrist,
        }
    }
}

impl Subsystem for Workcell {
    type State = CellState;

    fn machine(&self) -> &StateMachine<CellState> {
        self.coordinator.machine()
    }

    fn machine_mut(&mut self) -> &mut StateMachine<CellState> {
        self.coordinator.machine_mut()
    }

    fn transition(&mut self) {
        let target = match self.state() {
            CellState::Rest => ArmState::Stowed,
            CellState::Reach => ArmState::Extended,
        };
        self.coordinator.command_subsystem(&self.arm, target);
        self.coordinator.command_subsystem(&self.wrist, target);
    }
}

fn rig() -> (Handle<Workcell>, Handle<Arm>, Handle<Arm>) {
    let (_, _, ctx) = context();
    let arm = Handle::new(Arm::new(&ctx));
    let wrist = Handle::new(Arm::base(&ctx));
    let cell = Handle::new(Workcell::new(&ctx, arm.clone(), wrist.clone()));
    (cell, arm, wrist)
}

#[test]
fn commands_reach_subordinates() {
    let (cell, arm, wrist) = rig();
    cell.set_state(CellState::Reach);
    assert_eq!(arm.state(), ArmState::Extended);
    assert_eq!(wrist.state(), ArmState::Extended);
}

#[test]
fn overridden_subordinate_applies_latest_command_on_release() {
    let (cell, arm, wrist) = rig();
    let mut scheduler = Scheduler::new();
    scheduler.register(&arm);
    scheduler.register(&cell);

    let id = scheduler.schedule(arm.override_state(ArmState::Manual)).unwrap();
    cell.set_state(CellState::Reach);
    cell.set_state(CellState::Rest);
    cell.set_state(CellState::Reach);
    assert_eq!(arm.state(), ArmState::Manual);
    assert_eq!(arm.managed_state(), ArmState::Extended);
    assert_eq!(wrist.state(), ArmState::Extended);

    scheduler.run_tick();
    scheduler.cancel(id);
    assert_eq!(arm.state(), ArmState::Extended);
}

#[test]
fn coordinator_commands_from_scheduled_action() {
    let (cell, arm, _) = rig();
    let mut scheduler = Scheduler::new();
    let target = cell.clone();
    scheduler
        .schedule(
            RunOnce::new(move || target.set_state(CellState::Reach))
                .requiring([Claim::state(cell.id())]),
        )
        .unwrap();
    scheduler.run_tick();
    assert_eq!(cell.state(), CellState::Reach);
    assert_eq!(arm.state(), ArmState::Extended);
    assert!(scheduler.is_empty());
}
