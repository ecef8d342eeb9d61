//! Configuration schema types
//!
//! This module defines the backend selection, the per-backend build
//! properties and the rules document deserialized from YAML files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

// ============================================================================
// Backend Selection
// ============================================================================

/// Available road-network backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Procedural straight multi-lane road.
    #[default]
    Dragway,
    /// YAML-described lane graph.
    Multilane,
    /// OpenDRIVE-derived road network.
    Malidrive,
    /// OpenStreetMap-derived road network.
    Osm,
}

impl Backend {
    /// All backends, in declaration order.
    pub const ALL: [Self; 4] = [Self::Dragway, Self::Multilane, Self::Malidrive, Self::Osm];

    /// Returns the canonical lowercase name of the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dragway => "dragway",
            Self::Multilane => "multilane",
            Self::Malidrive => "malidrive",
            Self::Osm => "osm",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownBackend {
                value: s.to_string(),
                suggestion: suggest(s, Self::ALL.iter().map(|b| b.as_str())),
            })
    }
}

/// Returns the candidate closest to `input` if its Damerau-Levenshtein
/// distance is at most 3.
#[must_use]
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(|c| (c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c.to_string())
}

// ============================================================================
// Backend Build Properties
// ============================================================================

/// Attributes needed to build a dragway road network.
///
/// The defaults follow U.S. interstate standards: 3.7 m (12 ft) lanes and
/// 3 m (10 ft) shoulders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragwayBuildProperties {
    /// Number of lanes.
    pub num_lanes: u32,
    /// Length of the lanes in meters.
    pub length: f64,
    /// Width of each lane in meters.
    pub lane_width: f64,
    /// Width of the shoulders in meters. Both shoulders have the same width.
    pub shoulder_width: f64,
    /// Maximum modelled height above the road surface in meters.
    pub maximum_height: f64,
}

impl Default for DragwayBuildProperties {
    fn default() -> Self {
        Self {
            num_lanes: 2,
            length: 10.0,
            lane_width: 3.7,
            shoulder_width: 3.0,
            maximum_height: 5.2,
        }
    }
}

/// Attributes needed to build a multilane road network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilaneBuildProperties {
    /// YAML file describing the lane graph and its rules.
    pub yaml_file: PathBuf,
}

/// Geometry build policy for the malidrive backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BuildPolicy {
    /// Build on the calling thread.
    #[default]
    Sequential,
    /// Build with a pool of worker threads.
    Parallel,
}

impl BuildPolicy {
    /// Returns the configuration value for this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

/// Geometry simplification policy for the malidrive backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SimplificationPolicy {
    /// Keep geometries as described.
    #[default]
    #[serde(rename = "none")]
    #[cfg_attr(feature = "clap", value(name = "none"))]
    Keep,
    /// Merge geometries that can be simplified.
    #[serde(rename = "simplify")]
    Simplify,
}

impl SimplificationPolicy {
    /// Returns the configuration value for this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "none",
            Self::Simplify => "simplify",
        }
    }
}

/// OpenDRIVE standard strictness.
///
/// Parsed from `strict`, `allow_schema_errors`, `allow_semantic_errors`,
/// `permissive`, or a `|`-separated union of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StandardStrictnessPolicy {
    /// Whether XML schema violations are tolerated.
    pub allow_schema_errors: bool,
    /// Whether semantic violations are tolerated.
    pub allow_semantic_errors: bool,
}

impl StandardStrictnessPolicy {
    /// Rejects every violation.
    pub const STRICT: Self = Self {
        allow_schema_errors: false,
        allow_semantic_errors: false,
    };

    /// Tolerates every violation.
    pub const PERMISSIVE: Self = Self {
        allow_schema_errors: true,
        allow_semantic_errors: true,
    };

    const fn union(self, other: Self) -> Self {
        Self {
            allow_schema_errors: self.allow_schema_errors || other.allow_schema_errors,
            allow_semantic_errors: self.allow_semantic_errors || other.allow_semantic_errors,
        }
    }
}

impl Default for StandardStrictnessPolicy {
    fn default() -> Self {
        Self::PERMISSIVE
    }
}

impl fmt::Display for StandardStrictnessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.allow_schema_errors, self.allow_semantic_errors) {
            (false, false) => "strict",
            (true, false) => "allow_schema_errors",
            (false, true) => "allow_semantic_errors",
            (true, true) => "permissive",
        };
        f.write_str(name)
    }
}

impl FromStr for StandardStrictnessPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            field: "standard_strictness_policy".to_string(),
            value: s.to_string(),
            expected: "strict, allow_schema_errors, allow_semantic_errors, permissive, \
                       or a '|'-separated union of them"
                .to_string(),
        };

        let mut policy = Self::STRICT;
        for part in s.split('|') {
            let part = match part.trim() {
                "strict" => Self::STRICT,
                "allow_schema_errors" => Self {
                    allow_schema_errors: true,
                    allow_semantic_errors: false,
                },
                "allow_semantic_errors" => Self {
                    allow_schema_errors: false,
                    allow_semantic_errors: true,
                },
                "permissive" => Self::PERMISSIVE,
                _ => return Err(invalid()),
            };
            policy = policy.union(part);
        }
        Ok(policy)
    }
}

impl TryFrom<String> for StandardStrictnessPolicy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StandardStrictnessPolicy> for String {
    fn from(value: StandardStrictnessPolicy) -> Self {
        value.to_string()
    }
}

/// Attributes needed to build a malidrive road network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MalidriveBuildProperties {
    /// OpenDRIVE file path.
    pub xodr_file_path: PathBuf,
    /// Linear tolerance used to load the map.
    pub linear_tolerance: Option<f64>,
    /// Maximum linear tolerance used to load the map.
    pub max_linear_tolerance: Option<f64>,
    /// Geometry build policy.
    pub build_policy: BuildPolicy,
    /// Number of builder threads; zero lets the builder decide.
    pub number_of_threads: u32,
    /// Geometry simplification policy.
    pub simplification_policy: SimplificationPolicy,
    /// OpenDRIVE standard strictness.
    pub standard_strictness_policy: StandardStrictnessPolicy,
    /// Whether non-drivable lanes are omitted from the network.
    pub omit_nondrivable_lanes: bool,
    /// Rules document providing the road rule book.
    pub road_rule_book_file: Option<PathBuf>,
    /// Rules document providing the phase ring book.
    pub phase_ring_book_file: Option<PathBuf>,
    /// Rules document providing the intersection book.
    pub intersection_book_file: Option<PathBuf>,
}

/// Latitude and longitude of an OSM map's origin.
///
/// Written as `{lat, lon}`; the braces are optional when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapOrigin {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for MapOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:?}, {:?}}}", self.lat, self.lon)
    }
}

impl FromStr for MapOrigin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            field: "origin".to_string(),
            value: s.to_string(),
            expected: "two finite numbers written as {lat, lon}".to_string(),
        };

        let inner = s.trim();
        let inner = inner
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(inner);
        let mut parts = inner.split(',').map(str::trim);
        let (Some(latitude), Some(longitude), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let lat: f64 = latitude.parse().map_err(|_| invalid())?;
        let lon: f64 = longitude.parse().map_err(|_| invalid())?;
        if lat.is_finite() && lon.is_finite() {
            Ok(Self { lat, lon })
        } else {
            Err(invalid())
        }
    }
}

impl TryFrom<String> for MapOrigin {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MapOrigin> for String {
    fn from(value: MapOrigin) -> Self {
        value.to_string()
    }
}

/// Attributes needed to build an OSM road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmBuildProperties {
    /// OSM file path.
    pub osm_file: PathBuf,
    /// Linear tolerance used to load the map.
    pub linear_tolerance: f64,
    /// Angular tolerance used to load the map.
    pub angular_tolerance: f64,
    /// Map origin.
    pub origin: MapOrigin,
    /// Rules document providing the road rule book.
    pub road_rule_book_file: Option<PathBuf>,
    /// Rules document providing the phase ring book.
    pub phase_ring_book_file: Option<PathBuf>,
    /// Rules document providing the intersection book.
    pub intersection_book_file: Option<PathBuf>,
}

impl Default for OsmBuildProperties {
    fn default() -> Self {
        Self {
            osm_file: PathBuf::new(),
            linear_tolerance: 5e-2,
            angular_tolerance: 1e-3,
            origin: MapOrigin::default(),
            road_rule_book_file: None,
            phase_ring_book_file: None,
            intersection_book_file: None,
        }
    }
}

// ============================================================================
// Rules Document
// ============================================================================

/// Root of a rules YAML document.
///
/// Every section is optional, so the same document type serves a full
/// multilane description, a standalone phase ring book, or a rule book.
/// Unknown top-level keys (such as lane geometry) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesDocument {
    /// Geometry section of a multilane description; only its id is read.
    #[serde(
        rename = "maliput_multilane_builder",
        alias = "RoadGeometry",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub road_geometry: Option<RoadGeometrySection>,

    /// Rules whose states are discrete values.
    #[serde(
        rename = "DiscreteValueRules",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub discrete_value_rules: Vec<DiscreteValueRuleConfig>,

    /// Rules whose states are numeric ranges.
    #[serde(
        rename = "RangeValueRules",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub range_value_rules: Vec<RangeValueRuleConfig>,

    /// Phase rings and their transition graphs.
    #[serde(rename = "PhaseRings", default, skip_serializing_if = "Vec::is_empty")]
    pub phase_rings: Vec<PhaseRingConfig>,

    /// Intersections bound to phase rings.
    #[serde(
        rename = "Intersections",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub intersections: Vec<IntersectionConfig>,
}

/// Geometry section header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadGeometrySection {
    /// Road geometry identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A discrete value rule and its possible values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscreteValueRuleConfig {
    /// Rule identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Possible values, first one is the default state.
    #[serde(rename = "Values", default)]
    pub values: Vec<String>,
}

/// A range value rule and its possible ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeValueRuleConfig {
    /// Rule identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Possible ranges, first one is the default state.
    #[serde(rename = "Ranges", default)]
    pub ranges: Vec<RangeConfig>,
}

/// One state of a range value rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A phase ring: its phases and the transitions between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRingConfig {
    /// Ring identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Phases in declaration order.
    #[serde(rename = "Phases", default)]
    pub phases: Vec<PhaseConfig>,
    /// Successors of each phase, in preference order.
    #[serde(
        rename = "PhaseTransitionGraph",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub phase_transition_graph: IndexMap<String, Vec<NextPhaseConfig>>,
}

/// A phase and the rule states it imposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Phase identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Discrete value rule id to value.
    #[serde(
        rename = "DiscreteValueRuleStates",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub discrete_value_rule_states: IndexMap<String, String>,
    /// Bulb unique id to bulb state.
    #[serde(
        rename = "BulbStates",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bulb_states: Option<IndexMap<String, BulbState>>,
}

/// Edge of a phase transition graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPhaseConfig {
    /// Successor phase identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Informational time until the transition, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_until: Option<f64>,
}

/// An intersection controlled by a phase ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionConfig {
    /// Intersection identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Phase ring controlling the intersection.
    #[serde(rename = "PhaseRing")]
    pub phase_ring: String,
    /// Phase the ring starts in.
    #[serde(
        rename = "InitialPhase",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_phase: Option<String>,
}

/// State of a traffic-light bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulbState {
    /// Lit.
    On,
    /// Dark.
    Off,
    /// Flashing.
    Blinking,
}

impl fmt::Display for BulbState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Blinking => "Blinking",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_string_round_trip() {
        for backend in Backend::ALL {
            let parsed: Backend = backend.to_string().parse().unwrap();
            assert_eq!(parsed, backend);
        }
    }

    #[test]
    fn test_unknown_backend_suggests_close_match() {
        let err = "multilan".parse::<Backend>().unwrap_err();
        match err {
            ConfigError::UnknownBackend { value, suggestion } => {
                assert_eq!(value, "multilan");
                assert_eq!(suggestion.as_deref(), Some("multilane"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_backend_without_suggestion() {
        let err = "opendrive-xyz".parse::<Backend>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownBackend {
                suggestion: None,
                ..
            }
        ));
    }

    #[test]
    fn test_dragway_defaults() {
        let props = DragwayBuildProperties::default();
        assert_eq!(props.num_lanes, 2);
        assert!((props.length - 10.0).abs() < f64::EPSILON);
        assert!((props.lane_width - 3.7).abs() < f64::EPSILON);
        assert!((props.shoulder_width - 3.0).abs() < f64::EPSILON);
        assert!((props.maximum_height - 5.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malidrive_defaults() {
        let props = MalidriveBuildProperties::default();
        assert_eq!(props.build_policy, BuildPolicy::Sequential);
        assert_eq!(props.simplification_policy, SimplificationPolicy::Keep);
        assert_eq!(
            props.standard_strictness_policy,
            StandardStrictnessPolicy::PERMISSIVE
        );
        assert_eq!(props.number_of_threads, 0);
        assert!(props.linear_tolerance.is_none());
    }

    #[test]
    fn test_osm_defaults() {
        let props = OsmBuildProperties::default();
        assert!(props.osm_file.as_os_str().is_empty());
        assert!((props.linear_tolerance - 5e-2).abs() < f64::EPSILON);
        assert!((props.angular_tolerance - 1e-3).abs() < f64::EPSILON);
        assert_eq!(props.origin.to_string(), "{0.0, 0.0}");
    }

    #[test]
    fn test_map_origin_parse() {
        let origin: MapOrigin = "{37.4, -122.1}".parse().unwrap();
        assert!((origin.lat - 37.4).abs() < f64::EPSILON);
        assert!((origin.lon + 122.1).abs() < f64::EPSILON);
        assert_eq!("0., 0.".parse::<MapOrigin>().unwrap(), MapOrigin::default());

        assert!("{1.0}".parse::<MapOrigin>().is_err());
        assert!("{1.0, 2.0, 3.0}".parse::<MapOrigin>().is_err());
        assert!("{north, 2.0}".parse::<MapOrigin>().is_err());
        assert!("{inf, 2.0}".parse::<MapOrigin>().is_err());
    }

    #[test]
    fn test_strictness_policy_parse() {
        assert_eq!(
            "strict".parse::<StandardStrictnessPolicy>().unwrap(),
            StandardStrictnessPolicy::STRICT
        );
        assert_eq!(
            "permissive".parse::<StandardStrictnessPolicy>().unwrap(),
            StandardStrictnessPolicy::PERMISSIVE
        );
        let union = "allow_schema_errors|allow_semantic_errors"
            .parse::<StandardStrictnessPolicy>()
            .unwrap();
        assert_eq!(union, StandardStrictnessPolicy::PERMISSIVE);
        assert_eq!(union.to_string(), "permissive");

        let schema_only = "allow_schema_errors"
            .parse::<StandardStrictnessPolicy>()
            .unwrap();
        assert!(schema_only.allow_schema_errors);
        assert!(!schema_only.allow_semantic_errors);
        assert_eq!(schema_only.to_string(), "allow_schema_errors");
    }

    #[test]
    fn test_strictness_policy_rejects_unknown() {
        assert!("lenient".parse::<StandardStrictnessPolicy>().is_err());
        assert!("strict|".parse::<StandardStrictnessPolicy>().is_err());
    }

    #[test]
    fn test_rules_document_deserialize() {
        let yaml = r"
maliput_multilane_builder:
  id: basic_two_lane_x_intersection
  lane_width: 4
DiscreteValueRules:
  - ID: Right-Of-Way Rule Type/crosswalk
    Values: [Go, Stop]
RangeValueRules:
  - ID: Speed-Limit Rule Type/lane_1
    Ranges:
      - { min: 0.0, max: 16.6, description: urban }
PhaseRings:
  - ID: CrosswalkRing
    Phases:
      - ID: AllGoPhase
        DiscreteValueRuleStates:
          Right-Of-Way Rule Type/crosswalk: Go
        BulbStates:
          CrosswalkLight-Walk: On
      - ID: AllStopPhase
    PhaseTransitionGraph:
      AllGoPhase:
        - ID: AllStopPhase
          duration_until: 45
      AllStopPhase:
        - ID: AllGoPhase
Intersections:
  - ID: CrosswalkIntersection
    PhaseRing: CrosswalkRing
    InitialPhase: AllGoPhase
";
        let doc: RulesDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            doc.road_geometry.unwrap().id.as_deref(),
            Some("basic_two_lane_x_intersection")
        );
        assert_eq!(doc.discrete_value_rules[0].values, vec!["Go", "Stop"]);
        assert_eq!(doc.range_value_rules[0].ranges[0].description, "urban");

        let ring = &doc.phase_rings[0];
        assert_eq!(ring.phases.len(), 2);
        assert_eq!(
            ring.phases[0].bulb_states.as_ref().unwrap()["CrosswalkLight-Walk"],
            BulbState::On
        );
        assert!(ring.phases[1].bulb_states.is_none());
        let keys: Vec<&str> = ring
            .phase_transition_graph
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["AllGoPhase", "AllStopPhase"]);
        assert_eq!(
            ring.phase_transition_graph["AllGoPhase"][0].duration_until,
            Some(45.0)
        );
        assert_eq!(
            ring.phase_transition_graph["AllStopPhase"][0].duration_until,
            None
        );
        assert_eq!(
            doc.intersections[0].initial_phase.as_deref(),
            Some("AllGoPhase")
        );
    }

    #[test]
    fn test_rules_document_all_sections_optional() {
        let doc: RulesDocument = serde_yaml::from_str("SomethingElse: 1").unwrap();
        assert!(doc.road_geometry.is_none());
        assert!(doc.phase_rings.is_empty());
        assert!(doc.intersections.is_empty());
    }

    #[test]
    fn test_bulb_state_display() {
        assert_eq!(BulbState::On.to_string(), "On");
        assert_eq!(BulbState::Blinking.to_string(), "Blinking");
    }
}
