//! Integration test: state-to-tunable tables and tuning mode.

use helm_common::prelude::*;
use helm_control::state::{tunable_map, tunable_map_all};

use super::support::ArmState;

#[test]
fn table_covers_states_with_setpoints() {
    let tuning = Tuning::new(false);
    let table = tunable_map_all::<ArmState>(&tuning, "Arm/Setpoints");
    assert_eq!(table.len(), 2);
    assert!(!table.contains_key(&ArmState::Manual));
    assert_eq!(
        table[&ArmState::Extended].key(),
        format!("{TUNING_ROOT}Arm/Setpoints/Extended")
    );
    assert_eq!(table[&ArmState::Extended].get(), 1.0);
    assert_eq!(tuning.registered(), 2);
}

#[test]
fn explicit_state_list() {
    let tuning = Tuning::new(false);
    let table = tunable_map(&tuning, "Arm/Setpoints", &[ArmState::Stowed, ArmState::Manual]).unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.contains_key(&ArmState::Stowed));

    let err = tunable_map::<ArmState>(&tuning, "Arm/Setpoints", &[]).unwrap_err();
    assert!(matches!(err, TunableError::InvalidArgument(_)));
}

#[test]
fn tuning_mode_switches_backing_on_refresh() {
    let tuning = Tuning::new(false);
    let table = tunable_map_all::<ArmState>(&tuning, "Arm/Setpoints");
    let extended = &table[&ArmState::Extended];

    tuning.set_live("Arm/Setpoints/Extended", 2.0);
    assert_eq!(extended.get(), 1.0);

    tuning.set_enabled(true);
    assert_eq!(extended.get(), 1.0);
    assert!(tuning.refresh());
    assert!(extended.is_live());
    assert_eq!(extended.get(), 2.0);

    tuning.set_live("Arm/Setpoints/Extended", 3.0);
    assert_eq!(extended.get(), 3.0);

    tuning.set_enabled(false);
    assert!(tuning.refresh());
    tuning.set_live("Arm/Setpoints/Extended", 4.0);
    assert_eq!(extended.get(), 3.0);
    assert!(!tuning.refresh());
}

#[test]
fn change_detection_is_per_caller() {
    let tuning = Tuning::new(true);
    let table = tunable_map_all::<ArmState>(&tuning, "Arm/Setpoints");
    let stowed = &table[&ArmState::Stowed];

    assert!(stowed.has_changed(1));
    assert!(!stowed.has_changed(1));
    assert!(stowed.has_changed(2));

    tuning.set_live("Arm/Setpoints/Stowed", 0.25);
    assert!(stowed.has_changed(1));
    assert!(!stowed.has_changed(1));
    assert_eq!(stowed.get(), 0.25);
}
