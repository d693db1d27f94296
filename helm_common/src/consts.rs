//! System-wide constants for the HELM workspace.
//!
//! Single source of truth for tick timing and telemetry/tuning key layout.

use static_assertions::const_assert;

/// Default scheduler tick period in microseconds (50 Hz = 20 000 µs).
pub const TICK_PERIOD_US: u64 = 20_000;

/// Upper bound accepted for a configured tick period (1 s).
pub const MAX_TICK_PERIOD_US: u64 = 1_000_000;

const_assert!(TICK_PERIOD_US > 0 && TICK_PERIOD_US <= MAX_TICK_PERIOD_US);

/// Root key under which every tunable value is published.
pub const TUNING_ROOT: &str = "/Tuning/";

/// Telemetry key of the global tuning-mode flag.
pub const TUNING_ENABLED_KEY: &str = "Tuning/Enabled";

/// Separator between a telemetry namespace and its field.
pub const KEY_SEPARATOR: char = '/';

/// Default configuration file path for the control binary.
pub const DEFAULT_CONFIG_PATH: &str = "config/helm.toml";
