//! Subsystem state machines.
//!
//! Leaf first: variant sets, the machine and its override capabilities, the
//! subsystem hooks, shared handles, override actions and per-state tunables.

pub mod capability;
pub mod handle;
pub mod machine;
pub mod overrides;
pub mod subsystem;
pub mod tunables;
pub mod variant;

pub use capability::{Capability, GoalOverride, OverrideFlag, StateOverride};
pub use handle::Handle;
pub use machine::{MachineContext, StateMachine, SubsystemId};
pub use overrides::{GoalOverrideAction, OverrideAction};
pub use subsystem::{GoalReporting, Subsystem};
pub use tunables::{tunable_map, tunable_map_all};
pub use variant::StateVariant;
