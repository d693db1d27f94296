//! Per-state tunable setpoint tables.
//!
//! Built once at subsystem initialization: every variant carrying a default
//! setpoint gets a [`TunableNumber`] keyed `"<key>/<StateName>"` under the
//! tuning root. Variants without a default are left out of the table.

use std::collections::HashMap;
use std::rc::Rc;

use helm_common::tuning::{TunableError, TunableNumber, Tuning};
use tracing::debug;

use super::variant::StateVariant;

/// Tunables for the listed `states`.
///
/// # Errors
/// [`TunableError::InvalidArgument`] if `states` is empty.
pub fn tunable_map<S: StateVariant>(
    tuning: &Rc<Tuning>,
    key: &str,
    states: &[S],
) -> Result<HashMap<S, Rc<TunableNumber>>, TunableError> {
    if states.is_empty() {
        return Err(TunableError::InvalidArgument(format!(
            "no states given for tunable map '{key}'"
        )));
    }
    Ok(build(tuning, key, states))
}

/// Tunables for every variant of `S`.
pub fn tunable_map_all<S: StateVariant>(
    tuning: &Rc<Tuning>,
    key: &str,
) -> HashMap<S, Rc<TunableNumber>> {
    build(tuning, key, S::ALL)
}

fn build<S: StateVariant>(
    tuning: &Rc<Tuning>,
    key: &str,
    states: &[S],
) -> HashMap<S, Rc<TunableNumber>> {
    let map: HashMap<S, Rc<TunableNumber>> = states
        .iter()
        .filter_map(|&state| {
            let default = state.setpoint()?;
            let number = tuning.number(&format!("{key}/{}", state.name()), default);
            Some((state, number))
        })
        .collect();
    debug!(key, tunables = map.len(), "state tunables created");
    map
}
