//! Prelude module for common re-exports.
//!
//! ```rust
//! use helm_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Time ───────────────────────────────────────────────────────────
pub use crate::clock::{Clock, ManualClock, MonotonicClock};

// ─── Telemetry ──────────────────────────────────────────────────────
pub use crate::telemetry::{MemorySink, Telemetry, TelemetrySink, TelemetryValue, TracingSink};

// ─── Tuning ─────────────────────────────────────────────────────────
pub use crate::tuning::{TunableError, TunableNumber, TunablePid, Tuning};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{TICK_PERIOD_US, TUNING_ROOT};

/// Default scheduler tick period as Duration.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_micros(TICK_PERIOD_US);
