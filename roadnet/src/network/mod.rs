//! Road network model.
//!
//! A [`RoadNetwork`] bundles the identity of a road geometry with the rule
//! book, phase ring book, phase state store and intersection book that the
//! tools query. Geometry itself is never computed: the network only records
//! which backend produced it and with which build configuration.

pub mod builder;
pub mod ids;
pub mod intersection;
pub mod phase_provider;
pub mod phase_ring;
pub mod phase_ring_book;
pub mod rulebook;

use std::collections::BTreeMap;

use serde::Serialize;

use roadnet_core::config::Backend;

pub use builder::{get_resource, load_road_network};
pub use ids::{IntersectionId, PhaseId, PhaseRingId, RuleId};
pub use intersection::{Intersection, IntersectionBook};
pub use phase_provider::{
    ManualPhaseProvider, NextPhaseState, PhaseProviderResult, PhaseStateReader, PhaseStateWriter,
};
pub use phase_ring::{NextPhase, Phase, PhaseRing};
pub use phase_ring_book::{ManualPhaseRingBook, PhaseRingBook};
pub use rulebook::{DiscreteValueRule, Range, RangeValueRule, RoadRulebook};

use crate::error::NetworkError;

/// Identity of a road geometry and the configuration it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadGeometryInfo {
    /// Geometry identifier.
    pub id: String,
    /// Backend that produced it.
    pub backend: Backend,
    /// Builder configuration as string key/value pairs.
    pub configuration: BTreeMap<String, String>,
}

/// A loaded road network.
#[derive(Debug)]
pub struct RoadNetwork {
    road_geometry: RoadGeometryInfo,
    rulebook: RoadRulebook,
    phase_ring_book: ManualPhaseRingBook,
    phase_provider: ManualPhaseProvider,
    intersections: IntersectionBook,
}

impl RoadNetwork {
    /// Assembles a road network from its parts.
    ///
    /// The phase provider is expected to track every ring of the book;
    /// [`RoadNetwork::check_invariants`] reports when it does not.
    #[must_use]
    pub const fn new(
        road_geometry: RoadGeometryInfo,
        rulebook: RoadRulebook,
        phase_ring_book: ManualPhaseRingBook,
        phase_provider: ManualPhaseProvider,
        intersections: IntersectionBook,
    ) -> Self {
        Self {
            road_geometry,
            rulebook,
            phase_ring_book,
            phase_provider,
            intersections,
        }
    }

    /// Returns the road geometry identity.
    #[must_use]
    pub const fn road_geometry(&self) -> &RoadGeometryInfo {
        &self.road_geometry
    }

    /// Returns the rule book.
    #[must_use]
    pub const fn rulebook(&self) -> &RoadRulebook {
        &self.rulebook
    }

    /// Returns the phase ring book.
    #[must_use]
    pub fn phase_ring_book(&self) -> &dyn PhaseRingBook {
        &self.phase_ring_book
    }

    /// Returns the concrete phase ring book.
    #[must_use]
    pub const fn manual_phase_ring_book(&self) -> &ManualPhaseRingBook {
        &self.phase_ring_book
    }

    /// Returns read access to phase state.
    #[must_use]
    pub fn phase_provider(&self) -> &dyn PhaseStateReader {
        &self.phase_provider
    }

    /// Returns write access to phase state.
    #[must_use]
    pub fn phase_state_writer(&self) -> &dyn PhaseStateWriter {
        &self.phase_provider
    }

    /// Returns the intersection book.
    #[must_use]
    pub const fn intersections(&self) -> &IntersectionBook {
        &self.intersections
    }

    /// Returns the current phase of the ring controlling an intersection.
    ///
    /// # Errors
    ///
    /// Fails if the intersection is unknown or its ring is not tracked.
    pub fn intersection_phase(
        &self,
        id: &IntersectionId,
    ) -> Result<PhaseProviderResult, NetworkError> {
        let intersection = self
            .intersections
            .intersection(id)
            .ok_or_else(|| NetworkError::UnknownIntersection(id.to_string()))?;
        self.phase_provider
            .phase(&intersection.phase_ring_id)
            .ok_or_else(|| NetworkError::UntrackedPhaseRing(intersection.phase_ring_id.to_string()))
    }

    /// Checks the consistency of the phase state against the ring book.
    ///
    /// Returns one message per violation; an empty list means the network
    /// is consistent.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for ring in self.phase_ring_book.iter() {
            let Some(state) = self.phase_provider.phase(ring.id()) else {
                violations.push(format!(
                    "phase ring '{}' is not tracked by the phase provider",
                    ring.id()
                ));
                continue;
            };

            if ring.phase(&state.state).is_none() {
                violations.push(format!(
                    "phase ring '{}' is in unknown phase '{}'",
                    ring.id(),
                    state.state
                ));
                continue;
            }

            if let Some(next) = &state.next {
                let declared = ring
                    .next_phases(&state.state)
                    .is_ok_and(|n| n.iter().any(|p| p.id == next.state));
                if !declared {
                    violations.push(format!(
                        "phase ring '{}': '{}' is not a successor of '{}'",
                        ring.id(),
                        next.state,
                        state.state
                    ));
                }
            }
        }

        for intersection in self.intersections.iter() {
            if self
                .phase_ring_book
                .phase_ring(&intersection.phase_ring_id)
                .is_none()
            {
                violations.push(format!(
                    "intersection '{}' references unknown phase ring '{}'",
                    intersection.id, intersection.phase_ring_id
                ));
            }
        }

        violations
    }
}
