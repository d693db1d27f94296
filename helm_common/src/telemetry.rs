//! Append-only structured telemetry channel.
//!
//! Records are keyed `"<namespace>/<field>"` and carry text, booleans or
//! numbers. The channel is write-only from the producer's point of view; a
//! [`MemorySink`] keeps history so tests and the simulation report can read it
//! back.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::consts::KEY_SEPARATOR;

/// A single telemetry payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryValue {
    /// State names and other labels.
    Text(String),
    /// Flags.
    Bool(bool),
    /// Setpoints and measurements.
    Number(f64),
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for TelemetryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TelemetryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for TelemetryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for TelemetryValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Destination for telemetry records.
pub trait TelemetrySink {
    /// Append one record. Must not block.
    fn record(&self, key: &str, value: TelemetryValue);
}

/// Forwards every record to `tracing` under the `telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, key: &str, value: TelemetryValue) {
        tracing::debug!(target: "telemetry", key, %value);
    }
}

/// Keeps every record in insertion order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RefCell<Vec<(String, TelemetryValue)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent value recorded under `key`.
    pub fn latest(&self, key: &str) -> Option<TelemetryValue> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Every value recorded under `key`, oldest first.
    pub fn history(&self, key: &str) -> Vec<TelemetryValue> {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Number of records under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.entries.borrow().iter().filter(|(k, _)| k == key).count()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, key: &str, value: TelemetryValue) {
        self.entries.borrow_mut().push((key.to_string(), value));
    }
}

/// Per-namespace writer over a shared sink.
#[derive(Clone)]
pub struct Telemetry {
    namespace: String,
    sink: Rc<dyn TelemetrySink>,
}

impl Telemetry {
    pub fn new(namespace: impl Into<String>, sink: Rc<dyn TelemetrySink>) -> Self {
        Self {
            namespace: namespace.into(),
            sink,
        }
    }

    /// Namespace prefix of every key written through this handle.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Full key for `field`.
    pub fn key(&self, field: &str) -> String {
        format!("{}{KEY_SEPARATOR}{field}", self.namespace)
    }

    /// Record `value` under `"<namespace>/<field>"`.
    pub fn record(&self, field: &str, value: impl Into<TelemetryValue>) {
        self.sink.record(&self.key(field), value.into());
    }

    /// Writer for a nested namespace sharing the same sink.
    pub fn child(&self, name: &str) -> Self {
        Self {
            namespace: self.key(name),
            sink: Rc::clone(&self.sink),
        }
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
