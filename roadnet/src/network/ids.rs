//! Typed identifiers for road-network entities.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates a new identifier from a string.
            #[must_use]
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identifies a phase ring.
    PhaseRingId
);

string_id!(
    /// Identifies a phase within a phase ring.
    PhaseId
);

string_id!(
    /// Identifies an intersection.
    IntersectionId
);

string_id!(
    /// Identifies a discrete or range value rule.
    RuleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = PhaseId::new("AllGoPhase");
        assert_eq!(id.to_string(), "AllGoPhase");
        assert_eq!(id.as_str(), "AllGoPhase");
        assert_eq!(PhaseId::from("AllGoPhase"), id);
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let mut ids = vec![PhaseRingId::new("b"), PhaseRingId::new("a")];
        ids.sort();
        assert_eq!(ids, vec![PhaseRingId::new("a"), PhaseRingId::new("b")]);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RuleId::new("Speed-Limit/lane_1")).unwrap();
        assert_eq!(json, "\"Speed-Limit/lane_1\"");
    }
}
