//! Phase state store.
//!
//! The current phase of every ring, plus an optional hint about the phase
//! that follows it. Reading and writing are separate traits so that
//! consumers which only observe state never see the mutating surface.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;

use super::ids::{PhaseId, PhaseRingId};
use crate::error::NetworkError;

/// The phase a ring will move to next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextPhaseState {
    /// Next phase.
    pub state: PhaseId,
    /// Informational time until the transition, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_until: Option<f64>,
}

/// Current phase of a ring and, when known, its successor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseProviderResult {
    /// Current phase.
    pub state: PhaseId,
    /// Next phase; `None` for a ring that never changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NextPhaseState>,
}

/// Read access to phase state.
pub trait PhaseStateReader: Send + Sync {
    /// Returns the state of `ring`, or `None` if the ring is not tracked.
    fn phase(&self, ring: &PhaseRingId) -> Option<PhaseProviderResult>;
}

/// Write access to phase state.
pub trait PhaseStateWriter: PhaseStateReader {
    /// Starts tracking a ring.
    ///
    /// # Errors
    ///
    /// Fails if the ring is already tracked, or if `duration_until` is
    /// given without `next`.
    fn add_phase_ring(
        &self,
        ring: &PhaseRingId,
        initial: PhaseId,
        next: Option<PhaseId>,
        duration_until: Option<f64>,
    ) -> Result<(), NetworkError>;

    /// Replaces the state of a tracked ring.
    ///
    /// # Errors
    ///
    /// Fails if the ring is not tracked, or if `duration_until` is given
    /// without `next`.
    fn set_phase(
        &self,
        ring: &PhaseRingId,
        current: PhaseId,
        next: Option<PhaseId>,
        duration_until: Option<f64>,
    ) -> Result<(), NetworkError>;
}

/// Phase state store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct ManualPhaseProvider {
    phases: DashMap<PhaseRingId, PhaseProviderResult>,
}

impl ManualPhaseProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tracked rings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Returns true when no ring is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    fn make_result(
        ring: &PhaseRingId,
        current: PhaseId,
        next: Option<PhaseId>,
        duration_until: Option<f64>,
    ) -> Result<PhaseProviderResult, NetworkError> {
        let next = match (next, duration_until) {
            (None, Some(_)) => {
                return Err(NetworkError::DurationWithoutNextPhase(ring.to_string()));
            }
            (None, None) => None,
            (Some(state), duration_until) => Some(NextPhaseState {
                state,
                duration_until,
            }),
        };
        Ok(PhaseProviderResult {
            state: current,
            next,
        })
    }
}

impl PhaseStateReader for ManualPhaseProvider {
    fn phase(&self, ring: &PhaseRingId) -> Option<PhaseProviderResult> {
        self.phases.get(ring).map(|entry| entry.value().clone())
    }
}

impl PhaseStateWriter for ManualPhaseProvider {
    fn add_phase_ring(
        &self,
        ring: &PhaseRingId,
        initial: PhaseId,
        next: Option<PhaseId>,
        duration_until: Option<f64>,
    ) -> Result<(), NetworkError> {
        let result = Self::make_result(ring, initial, next, duration_until)?;
        match self.phases.entry(ring.clone()) {
            Entry::Occupied(_) => Err(NetworkError::DuplicatePhaseRing(ring.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(result);
                Ok(())
            }
        }
    }

    fn set_phase(
        &self,
        ring: &PhaseRingId,
        current: PhaseId,
        next: Option<PhaseId>,
        duration_until: Option<f64>,
    ) -> Result<(), NetworkError> {
        let result = Self::make_result(ring, current, next, duration_until)?;
        let mut entry = self
            .phases
            .get_mut(ring)
            .ok_or_else(|| NetworkError::UntrackedPhaseRing(ring.to_string()))?;
        *entry = result;
        Ok(())
    }
}
