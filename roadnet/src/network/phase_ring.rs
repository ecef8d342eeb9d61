//! Phases and phase rings.
//!
//! A phase ring owns a set of phases and a transition graph whose edges
//! point from a phase to its possible successors. Successors are kept in
//! declaration order; consumers that need a single successor take the
//! first one.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use roadnet_core::config::BulbState;

use super::ids::{PhaseId, PhaseRingId, RuleId};
use crate::error::NetworkError;

/// A named discrete state of a phase ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phase {
    /// Phase identifier.
    pub id: PhaseId,
    /// States imposed on discrete value rules while this phase is active.
    pub discrete_value_rule_states: IndexMap<RuleId, String>,
    /// Bulb states while this phase is active, if the phase drives lights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulb_states: Option<IndexMap<String, BulbState>>,
}

impl Phase {
    /// Creates a phase with no rule or bulb states.
    #[must_use]
    pub fn new(id: impl Into<PhaseId>) -> Self {
        Self {
            id: id.into(),
            discrete_value_rule_states: IndexMap::new(),
            bulb_states: None,
        }
    }
}

/// Edge of a phase transition graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextPhase {
    /// Successor phase.
    pub id: PhaseId,
    /// Informational time until the transition, in seconds.
    pub duration_until: Option<f64>,
}

impl NextPhase {
    /// Creates a transition edge.
    #[must_use]
    pub fn new(id: impl Into<PhaseId>, duration_until: Option<f64>) -> Self {
        Self {
            id: id.into(),
            duration_until,
        }
    }
}

/// A phase ring: phases in declaration order plus their successors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRing {
    id: PhaseRingId,
    phases: IndexMap<PhaseId, Phase>,
    next_phases: HashMap<PhaseId, Vec<NextPhase>>,
}

impl PhaseRing {
    /// Builds a phase ring.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidPhaseRing`] when the ring has no
    /// phases, repeats a phase id, references an unknown phase in the
    /// transition graph, or carries a negative `duration_until`.
    pub fn new(
        id: PhaseRingId,
        phases: Vec<Phase>,
        transitions: Vec<(PhaseId, Vec<NextPhase>)>,
    ) -> Result<Self, NetworkError> {
        let invalid = |reason: String| NetworkError::InvalidPhaseRing {
            ring: id.to_string(),
            reason,
        };

        if phases.is_empty() {
            return Err(invalid("a phase ring needs at least one phase".to_string()));
        }

        let mut by_id = IndexMap::with_capacity(phases.len());
        for phase in phases {
            let phase_id = phase.id.clone();
            if by_id.insert(phase_id.clone(), phase).is_some() {
                return Err(invalid(format!("duplicate phase '{phase_id}'")));
            }
        }

        let mut next_phases = HashMap::with_capacity(transitions.len());
        for (from, successors) in transitions {
            if !by_id.contains_key(&from) {
                return Err(invalid(format!("transition from unknown phase '{from}'")));
            }
            let mut seen = HashSet::new();
            for next in &successors {
                if !by_id.contains_key(&next.id) {
                    return Err(invalid(format!(
                        "transition from '{from}' to unknown phase '{}'",
                        next.id
                    )));
                }
                if !seen.insert(&next.id) {
                    return Err(invalid(format!(
                        "transition from '{from}' to '{}' declared twice",
                        next.id
                    )));
                }
                if next.duration_until.is_some_and(|d| !(d >= 0.0)) {
                    return Err(invalid(format!(
                        "transition from '{from}' to '{}' has a negative duration_until",
                        next.id
                    )));
                }
            }
            if next_phases.insert(from.clone(), successors).is_some() {
                return Err(invalid(format!("transitions from '{from}' declared twice")));
            }
        }

        Ok(Self {
            id,
            phases: by_id,
            next_phases,
        })
    }

    /// Returns the ring identifier.
    #[must_use]
    pub const fn id(&self) -> &PhaseRingId {
        &self.id
    }

    /// Returns the phases in declaration order.
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.values()
    }

    /// Returns the phase with the given id.
    #[must_use]
    pub fn phase(&self, id: &PhaseId) -> Option<&Phase> {
        self.phases.get(id)
    }

    /// Returns the first declared phase.
    #[must_use]
    pub fn first_phase(&self) -> &Phase {
        // `new` rejects empty rings.
        &self.phases[0]
    }

    /// Returns the successors of `id` in declaration order.
    ///
    /// A phase without declared transitions yields an empty slice.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownPhase`] when `id` is not in this ring.
    pub fn next_phases(&self, id: &PhaseId) -> Result<&[NextPhase], NetworkError> {
        if !self.phases.contains_key(id) {
            return Err(NetworkError::UnknownPhase {
                ring: self.id.to_string(),
                phase: id.to_string(),
            });
        }
        Ok(self.next_phases.get(id).map_or(&[], Vec::as_slice))
    }

    /// Returns whether any phase of the ring has a successor.
    #[must_use]
    pub fn has_transitions(&self) -> bool {
        self.next_phases.values().any(|v| !v.is_empty())
    }
}
