//! Host scheduler: actions, composition, claim ownership and triggers.

pub mod action;
pub mod compose;
pub mod ownership;
pub mod runner;
pub mod trigger;

pub use action::{Action, ActionId, ActionKind, EndReason, InterruptBehavior};
pub use compose::{ActionExt, Idle, Parallel, Race, RunOnce, Sequence, WaitUntil};
pub use ownership::{Claim, Facet, OwnershipTable};
pub use runner::{Refresh, ScheduleError, Scheduler};
pub use trigger::Trigger;
