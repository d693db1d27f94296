//! HELM Common Library
//!
//! Shared leaf types for every HELM crate: configuration loading, the
//! monotonic clock, the telemetry channel and the live-tunable store.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`clock`] - Monotonic time source
//! - [`telemetry`] - Keyed structured telemetry sink
//! - [`tuning`] - Tuning mode and tunable numbers
//! - [`consts`] - Workspace-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use helm_common::prelude::*;
//! ```

pub mod clock;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod telemetry;
pub mod tuning;
