//! Property test: random request/override/release sequences.
//!
//! After every step the arm either shows the forced state of the live
//! override, or, with no override, its managed state; and the managed state
//! is always the latest request.

use helm_control::scheduler::{ActionId, Scheduler};
use helm_control::state::{Handle, StateVariant};
use proptest::prelude::*;

use super::support::{Arm, ArmState, context};

#[derive(Debug, Clone)]
enum Op {
    Request(ArmState),
    Override(ArmState),
    Release,
    Tick,
}

fn arm_state() -> impl Strategy<Value = ArmState> {
    prop::sample::select(ArmState::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arm_state().prop_map(Op::Request),
        arm_state().prop_map(Op::Override),
        Just(Op::Release),
        Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn override_invariants_hold(ops in prop::collection::vec(op(), 1..64)) {
        let (clock, _, ctx) = context();
        let arm = Handle::new(Arm::new(&ctx));
        let mut scheduler = Scheduler::new();
        scheduler.register(&arm);

        let mut requested = ArmState::Stowed;
        let mut forced: Option<(ActionId, ArmState)> = None;

        for op in ops {
            match op {
                Op::Request(state) => {
                    arm.set_state(state);
                    requested = state;
                }
                Op::Override(state) => {
                    let id = scheduler.schedule(arm.override_state(state)).unwrap();
                    forced = Some((id, state));
                }
                Op::Release => {
                    if let Some((id, _)) = forced.take() {
                        prop_assert!(scheduler.cancel(id));
                    }
                }
                Op::Tick => {
                    clock.advance(0.02);
                    scheduler.run_tick();
                }
            }

            prop_assert_eq!(arm.managed_state(), requested);
            match forced {
                Some((_, state)) => {
                    prop_assert!(arm.is_overridden());
                    prop_assert_eq!(arm.state(), state);
                }
                None => {
                    prop_assert!(!arm.is_overridden());
                    prop_assert_eq!(arm.state(), requested);
                }
            }
            prop_assert!(scheduler.len() <= 1);
        }
    }
}
