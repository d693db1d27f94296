//! Simulated superstructure used by the control binary.
//!
//! An elevator and an intake under a superstructure coordinator, driven by a
//! scripted [`Scenario`](scenario::Scenario).

pub mod elevator;
pub mod intake;
pub mod scenario;
pub mod superstructure;

pub use elevator::{Elevator, ElevatorState};
pub use intake::{Intake, IntakeState};
pub use scenario::{Scenario, ScenarioReport, StateChange, SubsystemSnapshot, run};
pub use superstructure::{Superstructure, SuperstructureState};
