//! Error type for the control binary and scenario builder.
//!
//! Core state operations cannot fail; everything here comes from
//! initialization (config, tunables, scenario wiring) or from writing the
//! run report. Schedule refusals stay with the scheduler's caller.

use helm_common::config::ConfigError;
use helm_common::tuning::TunableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tunable(#[from] TunableError),

    /// A name in the configuration does not match any known subsystem or state.
    #[error("unknown {kind} '{name}'")]
    Unknown { kind: &'static str, name: String },

    #[error("report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl ControlError {
    pub(crate) fn unknown(kind: &'static str, name: &str) -> Self {
        Self::Unknown {
            kind,
            name: name.to_string(),
        }
    }
}
