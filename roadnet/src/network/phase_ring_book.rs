//! Phase ring book: the read-only catalogue of phase rings.

use std::collections::BTreeMap;

use super::ids::PhaseRingId;
use super::phase_ring::PhaseRing;
use crate::error::NetworkError;

/// Read access to the phase rings of a road network.
pub trait PhaseRingBook: Send + Sync {
    /// Returns the ids of every ring, in ascending order.
    fn phase_rings(&self) -> Vec<PhaseRingId>;

    /// Returns the ring with the given id.
    fn phase_ring(&self, id: &PhaseRingId) -> Option<&PhaseRing>;
}

/// A phase ring book populated at load time.
#[derive(Debug, Clone, Default)]
pub struct ManualPhaseRingBook {
    rings: BTreeMap<PhaseRingId, PhaseRing>,
}

impl ManualPhaseRingBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a ring to the book.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DuplicatePhaseRing`] if a ring with the same
    /// id is already present.
    pub fn add_phase_ring(&mut self, ring: PhaseRing) -> Result<(), NetworkError> {
        let id = ring.id().clone();
        if self.rings.contains_key(&id) {
            return Err(NetworkError::DuplicatePhaseRing(id.to_string()));
        }
        self.rings.insert(id, ring);
        Ok(())
    }

    /// Returns the number of rings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// Returns true when the book has no rings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Iterates rings in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &PhaseRing> {
        self.rings.values()
    }
}

impl PhaseRingBook for ManualPhaseRingBook {
    fn phase_rings(&self) -> Vec<PhaseRingId> {
        self.rings.keys().cloned().collect()
    }

    fn phase_ring(&self, id: &PhaseRingId) -> Option<&PhaseRing> {
        self.rings.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::phase_ring::Phase;

    fn ring(id: &str) -> PhaseRing {
        PhaseRing::new(PhaseRingId::new(id), vec![Phase::new("Only")], vec![]).unwrap()
    }

    #[test]
    fn test_phase_rings_sorted() {
        let mut book = ManualPhaseRingBook::new();
        book.add_phase_ring(ring("b")).unwrap();
        book.add_phase_ring(ring("a")).unwrap();
        book.add_phase_ring(ring("c")).unwrap();

        let ids: Vec<_> = book.phase_rings().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_duplicate_ring_rejected() {
        let mut book = ManualPhaseRingBook::new();
        book.add_phase_ring(ring("a")).unwrap();
        let err = book.add_phase_ring(ring("a")).unwrap_err();
        assert_eq!(err, NetworkError::DuplicatePhaseRing("a".to_string()));
    }

    #[test]
    fn test_phase_ring_lookup() {
        let mut book = ManualPhaseRingBook::new();
        assert!(book.is_empty());
        book.add_phase_ring(ring("a")).unwrap();
        assert!(book.phase_ring(&PhaseRingId::new("a")).is_some());
        assert!(book.phase_ring(&PhaseRingId::new("z")).is_none());
    }
}
