//! Claim ownership table.
//!
//! Each claim is held by at most one scheduled action. Arbitration policy
//! (supersede or reject) lives in the runner; this table only records who
//! holds what.

use std::collections::HashMap;
use std::fmt;

use crate::state::machine::SubsystemId;

use super::action::ActionId;

/// Facet of a subsystem an action can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Facet {
    /// State commanding and state overrides.
    State,
    /// Goal-report overrides.
    Goal,
}

/// `(subsystem, facet)` pair held by an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Claim {
    pub subsystem: SubsystemId,
    pub facet: Facet,
}

impl Claim {
    pub fn state(subsystem: &SubsystemId) -> Self {
        Self {
            subsystem: subsystem.clone(),
            facet: Facet::State,
        }
    }

    pub fn goal(subsystem: &SubsystemId) -> Self {
        Self {
            subsystem: subsystem.clone(),
            facet: Facet::Goal,
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.subsystem, self.facet)
    }
}

/// `Claim → ActionId` map.
#[derive(Debug, Default)]
pub struct OwnershipTable {
    owners: HashMap<Claim, ActionId>,
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner_of(&self, claim: &Claim) -> Option<ActionId> {
        self.owners.get(claim).copied()
    }

    /// Current owners of any of `claims`, one entry per claim held, in
    /// `claims` order.
    pub fn conflicts(&self, claims: &[Claim]) -> Vec<(Claim, ActionId)> {
        claims
            .iter()
            .filter_map(|claim| self.owner_of(claim).map(|owner| (claim.clone(), owner)))
            .collect()
    }

    /// Record `owner` for every claim, replacing previous owners.
    pub fn acquire(&mut self, claims: &[Claim], owner: ActionId) {
        for claim in claims {
            self.owners.insert(claim.clone(), owner);
        }
    }

    /// Drop every claim held by `owner`. Returns how many were held.
    pub fn release(&mut self, owner: ActionId) -> usize {
        let before = self.owners.len();
        self.owners.retain(|_, held_by| *held_by != owner);
        before - self.owners.len()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
