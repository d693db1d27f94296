//! # HELM Control Library
//!
//! Override-capable hierarchical state machines for fixed-tick subsystem
//! control. Every subsystem owns a [`StateMachine`](state::StateMachine)
//! over a closed set of named states; operators can temporarily force a
//! state or an at-goal answer through scheduled override actions, and
//! coordinators command subordinate subsystems through the same path as
//! any other caller.
//!
//! ## Layers
//!
//! 1. **state**: state variants, the machine, override capabilities,
//!    subsystem handles and state-to-tunable tables
//! 2. **coordinator**: machines that command other subsystems
//! 3. **scheduler**: actions, ownership claims, triggers and the tick runner
//! 4. **sim** / **cycle**: the simulated superstructure and its tick loop
//!
//! Everything runs on one thread; subsystems are shared as
//! [`Handle`](state::Handle)s between coordinators and scheduled actions.

pub mod config;
pub mod coordinator;
pub mod cycle;
pub mod error;
pub mod scheduler;
pub mod sim;
pub mod state;

#[cfg(test)]
mod testing;
