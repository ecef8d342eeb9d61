//! Intersections controlled by phase rings.

use indexmap::IndexMap;
use serde::Serialize;

use super::ids::{IntersectionId, PhaseRingId};
use crate::error::NetworkError;

/// An intersection and the phase ring that controls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intersection {
    /// Intersection identifier.
    pub id: IntersectionId,
    /// Controlling phase ring.
    pub phase_ring_id: PhaseRingId,
}

/// Intersections in declaration order.
#[derive(Debug, Clone, Default)]
pub struct IntersectionBook {
    intersections: IndexMap<IntersectionId, Intersection>,
}

impl IntersectionBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DuplicateIntersection`] when an intersection
    /// with the same id already exists.
    pub fn add_intersection(&mut self, intersection: Intersection) -> Result<(), NetworkError> {
        if self.intersections.contains_key(&intersection.id) {
            return Err(NetworkError::DuplicateIntersection(
                intersection.id.to_string(),
            ));
        }
        self.intersections
            .insert(intersection.id.clone(), intersection);
        Ok(())
    }

    /// Returns the intersection with the given id.
    #[must_use]
    pub fn intersection(&self, id: &IntersectionId) -> Option<&Intersection> {
        self.intersections.get(id)
    }

    /// Iterates intersections in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    /// Returns the number of intersections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    /// Returns true when the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intersection(id: &str, ring: &str) -> Intersection {
        Intersection {
            id: IntersectionId::new(id),
            phase_ring_id: PhaseRingId::new(ring),
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let mut book = IntersectionBook::new();
        book.add_intersection(intersection("Crosswalk", "CrosswalkRing"))
            .unwrap();
        let found = book.intersection(&IntersectionId::new("Crosswalk")).unwrap();
        assert_eq!(found.phase_ring_id, PhaseRingId::new("CrosswalkRing"));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_duplicate_intersection_rejected() {
        let mut book = IntersectionBook::new();
        book.add_intersection(intersection("Crosswalk", "A")).unwrap();
        let err = book
            .add_intersection(intersection("Crosswalk", "B"))
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::DuplicateIntersection("Crosswalk".to_string())
        );
    }
}
