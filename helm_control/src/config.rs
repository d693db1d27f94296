//! Control binary configuration.
//!
//! One TOML file with four tables:
//!
//! ```toml
//! [shared]
//! service_name = "helm-sim"
//!
//! [tick]
//! period_us = 20000
//! ticks = 600
//!
//! [tuning]
//! enabled = true
//! values = { "Elevator/Setpoints/Score" = 1.25 }
//!
//! [[sim.events]]
//! kind = "request"
//! at_tick = 5
//! state = "Intaking"
//! ```
//!
//! Only `[shared]` is required. Names of subsystems and states inside
//! `sim.events` are resolved when the scenario is built.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use helm_common::config::{ConfigError, ConfigLoader, SharedConfig};
use helm_common::consts::{MAX_TICK_PERIOD_US, TICK_PERIOD_US};
use serde::{Deserialize, Serialize};

// ─── Tick ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Scheduler tick period [µs].
    pub period_us: u64,
    /// Number of ticks the scenario runs for.
    pub ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period_us: TICK_PERIOD_US,
            ticks: 500,
        }
    }
}

impl TickConfig {
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us)
    }
}

// ─── Tuning ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Tuning mode at startup.
    pub enabled: bool,
    /// Live-table seed, keyed relative to the tuning root.
    pub values: BTreeMap<String, f64>,
}

// ─── Simulation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevatorConfig {
    /// Proportional gain of the position loop [1/s].
    pub kp: f64,
    /// Carriage speed limit [m/s].
    pub max_speed: f64,
    /// At-goal band [m].
    pub tolerance: f64,
    /// Carriage height at startup [m].
    pub start_position: f64,
    /// States whose setpoints are exposed for tuning. Every state with a
    /// setpoint when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuned_states: Option<Vec<String>>,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            kp: 8.0,
            max_speed: 2.0,
            tolerance: 0.02,
            start_position: 0.0,
            tuned_states: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Time spent intaking before a game piece is sensed [s].
    pub intake_time: f64,
    /// Time spent ejecting before returning to idle [s].
    pub eject_time: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            intake_time: 0.5,
            eject_time: 0.3,
        }
    }
}

/// Scripted input to the scenario, keyed on the scheduler tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    /// Coordinator automation: request a superstructure state.
    Request { at_tick: u64, state: String },
    /// Hold a state override on `subsystem` for `[at_tick, until_tick)`.
    OverrideState {
        subsystem: String,
        state: String,
        at_tick: u64,
        until_tick: u64,
    },
    /// Hold a goal override on `subsystem` for `[at_tick, until_tick)`.
    OverrideGoal {
        subsystem: String,
        value: bool,
        at_tick: u64,
        until_tick: u64,
    },
    /// Request a tuning-mode change.
    Tuning { at_tick: u64, enabled: bool },
    /// Edit a live tunable value.
    SetLive { at_tick: u64, key: String, value: f64 },
}

impl SimEvent {
    pub fn at_tick(&self) -> u64 {
        match self {
            Self::Request { at_tick, .. }
            | Self::OverrideState { at_tick, .. }
            | Self::OverrideGoal { at_tick, .. }
            | Self::Tuning { at_tick, .. }
            | Self::SetLive { at_tick, .. } => *at_tick,
        }
    }

    /// End of the hold window, for window events.
    pub fn until_tick(&self) -> Option<u64> {
        match self {
            Self::OverrideState { until_tick, .. } | Self::OverrideGoal { until_tick, .. } => {
                Some(*until_tick)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub elevator: ElevatorConfig,
    pub intake: IntakeConfig,
    pub events: Vec<SimEvent>,
}

// ─── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

impl ControlConfig {
    /// Check bounds and event windows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.tick.period_us == 0 || self.tick.period_us > MAX_TICK_PERIOD_US {
            return Err(invalid(format!(
                "tick.period_us must be in 1..={MAX_TICK_PERIOD_US}, got {}",
                self.tick.period_us
            )));
        }
        if self.tick.ticks == 0 {
            return Err(invalid("tick.ticks must be > 0".to_string()));
        }

        let elevator = &self.sim.elevator;
        for (name, value) in [
            ("kp", elevator.kp),
            ("max_speed", elevator.max_speed),
            ("tolerance", elevator.tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("sim.elevator.{name} must be > 0, got {value}")));
            }
        }
        if !elevator.start_position.is_finite() {
            return Err(invalid("sim.elevator.start_position must be finite".to_string()));
        }

        let intake = &self.sim.intake;
        for (name, value) in [
            ("intake_time", intake.intake_time),
            ("eject_time", intake.eject_time),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("sim.intake.{name} must be >= 0, got {value}")));
            }
        }

        for (i, event) in self.sim.events.iter().enumerate() {
            if let Some(until) = event.until_tick() {
                if until <= event.at_tick() {
                    return Err(invalid(format!(
                        "sim.events[{i}]: until_tick ({until}) must be after at_tick ({})",
                        event.at_tick()
                    )));
                }
            }
        }

        for (key, value) in &self.tuning.values {
            if !value.is_finite() {
                return Err(invalid(format!("tuning.values.{key} must be finite")));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError(message)
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<ControlConfig, ConfigError> {
    let config = ControlConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate an in-memory configuration.
pub fn load_config_from_str(content: &str) -> Result<ControlConfig, ConfigError> {
    let config = ControlConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}
