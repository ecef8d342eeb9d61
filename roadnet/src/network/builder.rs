//! Road network construction for each backend.
//!
//! Every backend produces a [`RoadNetwork`] whose geometry is described by
//! an id and a builder configuration. Rules, phase rings and intersections
//! come from rules YAML documents loaded through [`ConfigLoader`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::{
    Backend, ConfigLoader, DragwayBuildProperties, MalidriveBuildProperties,
    MultilaneBuildProperties, OsmBuildProperties, RuleSources, RulesDocument,
};
use crate::error::{ConfigError, NetworkError, Result};

use super::{
    DiscreteValueRule, Intersection, IntersectionBook, IntersectionId, ManualPhaseProvider,
    ManualPhaseRingBook, NextPhase, Phase, PhaseId, PhaseRing, PhaseRingBook, PhaseRingId,
    PhaseStateWriter, Range, RangeValueRule, RoadGeometryInfo, RoadNetwork, RoadRulebook, RuleId,
};

const MALIDRIVE_RESOURCE_ROOT: &str = "MALIPUT_MALIDRIVE_RESOURCE_ROOT";
const MULTILANE_RESOURCE_ROOT: &str = "MULTILANE_RESOURCE_ROOT";
const OSM_RESOURCE_ROOT: &str = "MALIPUT_OSM_RESOURCE_ROOT";

const DEFAULT_MULTILANE_ID: &str = "multilane";
const MALIDRIVE_ROAD_GEOMETRY_ID: &str = "malidrive_rg";
const OSM_ROAD_GEOMETRY_ID: &str = "maliput_osm_rg";

const MALIDRIVE_ANGULAR_TOLERANCE: f64 = 1e-3;
const MALIDRIVE_SCALE_LENGTH: f64 = 1.0;
const INERTIAL_TO_BACKEND_FRAME_TRANSLATION: &str = "{0., 0., 0.}";

// ============================================================================
// Resources
// ============================================================================

/// Resolves a resource file for a backend.
///
/// Relative names are looked up under the backend's resource root
/// (`$MALIPUT_MALIDRIVE_RESOURCE_ROOT/resources/odr/` for malidrive,
/// `$MALIPUT_OSM_RESOURCE_ROOT/resources/osm/` for osm,
/// `$MULTILANE_RESOURCE_ROOT/` for multilane). When the variable is unset or
/// the file does not exist there, `name` is returned unchanged. Absolute
/// names are always returned unchanged.
#[must_use]
pub fn get_resource(backend: Backend, name: &Path) -> PathBuf {
    if name.is_absolute() {
        return name.to_path_buf();
    }

    let candidate = match backend {
        Backend::Malidrive => std::env::var_os(MALIDRIVE_RESOURCE_ROOT)
            .map(|root| PathBuf::from(root).join("resources").join("odr").join(name)),
        Backend::Osm => std::env::var_os(OSM_RESOURCE_ROOT)
            .map(|root| PathBuf::from(root).join("resources").join("osm").join(name)),
        Backend::Multilane => {
            std::env::var_os(MULTILANE_RESOURCE_ROOT).map(|root| PathBuf::from(root).join(name))
        }
        Backend::Dragway => None,
    };

    match candidate {
        Some(path) if path.exists() => {
            tracing::debug!(resource = %name.display(), resolved = %path.display(), "resolved resource");
            path
        }
        _ => name.to_path_buf(),
    }
}

// ============================================================================
// Backends
// ============================================================================

/// Loads a road network with the selected backend.
///
/// Only the build properties of the selected backend are read.
///
/// # Errors
///
/// Returns an error if the build properties are invalid, a referenced file
/// cannot be loaded, or the rules do not form a consistent network.
pub fn load_road_network(
    backend: Backend,
    dragway: &DragwayBuildProperties,
    multilane: &MultilaneBuildProperties,
    malidrive: &MalidriveBuildProperties,
    osm: &OsmBuildProperties,
) -> Result<RoadNetwork> {
    match backend {
        Backend::Dragway => create_dragway(dragway),
        Backend::Multilane => create_multilane(multilane),
        Backend::Malidrive => create_malidrive(malidrive),
        Backend::Osm => create_osm(osm),
    }
}

/// Builds a dragway: straight parallel lanes with no rules.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for a zero lane count, a
/// non-positive length or lane width, or a negative shoulder width or
/// maximum height.
pub fn create_dragway(props: &DragwayBuildProperties) -> Result<RoadNetwork> {
    tracing::debug!(num_lanes = props.num_lanes, "building dragway road network");

    if props.num_lanes == 0 {
        return Err(invalid("num_lanes", props.num_lanes, "at least 1").into());
    }
    check_positive("length", props.length)?;
    check_positive("lane_width", props.lane_width)?;
    check_non_negative("shoulder_width", props.shoulder_width)?;
    check_non_negative("maximum_height", props.maximum_height)?;

    let configuration = BTreeMap::from([
        ("num_lanes".to_string(), props.num_lanes.to_string()),
        ("length".to_string(), props.length.to_string()),
        ("lane_width".to_string(), props.lane_width.to_string()),
        ("shoulder_width".to_string(), props.shoulder_width.to_string()),
        ("maximum_height".to_string(), props.maximum_height.to_string()),
    ]);

    let geometry = RoadGeometryInfo {
        id: format!("Dragway with {} lanes.", props.num_lanes),
        backend: Backend::Dragway,
        configuration,
    };
    Ok(build_road_network(geometry, &RulesDocument::default())?)
}

/// Builds a multilane network from a YAML description.
///
/// The file provides the geometry id and every rule section.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] when no file is given, or any
/// error from loading the file.
pub fn create_multilane(props: &MultilaneBuildProperties) -> Result<RoadNetwork> {
    tracing::debug!("building multilane road network");

    if props.yaml_file.as_os_str().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "yaml_file".to_string(),
            backend: Backend::Multilane.to_string(),
        }
        .into());
    }

    let yaml_file = get_resource(Backend::Multilane, &props.yaml_file);
    let mut loader = ConfigLoader::with_defaults();
    let loaded = loader.load_books(&RuleSources::single(&yaml_file))?;
    log_warnings(&loaded.warnings);

    let id = loaded
        .document
        .road_geometry
        .as_ref()
        .and_then(|g| g.id.clone())
        .unwrap_or_else(|| DEFAULT_MULTILANE_ID.to_string());

    let geometry = RoadGeometryInfo {
        id,
        backend: Backend::Multilane,
        configuration: BTreeMap::from([(
            "yaml_file".to_string(),
            yaml_file.display().to_string(),
        )]),
    };
    Ok(build_road_network(geometry, &loaded.document)?)
}

/// Builds a malidrive network.
///
/// The OpenDRIVE file must exist but is not parsed; rule, phase ring and
/// intersection books are loaded from their own files when given.
///
/// # Errors
///
/// Returns an error for an empty or missing OpenDRIVE path, inconsistent
/// tolerances, or any error from loading the book files.
pub fn create_malidrive(props: &MalidriveBuildProperties) -> Result<RoadNetwork> {
    tracing::debug!("building malidrive road network");

    if props.xodr_file_path.as_os_str().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "xodr_file_path".to_string(),
            backend: Backend::Malidrive.to_string(),
        }
        .into());
    }
    let opendrive_file = existing_resource(Backend::Malidrive, &props.xodr_file_path)?;

    if let Some(tolerance) = props.linear_tolerance {
        check_positive("linear_tolerance", tolerance)?;
    }
    if let Some(tolerance) = props.max_linear_tolerance {
        check_positive("max_linear_tolerance", tolerance)?;
    }
    if let (Some(min), Some(max)) = (props.linear_tolerance, props.max_linear_tolerance) {
        if max < min {
            return Err(invalid(
                "max_linear_tolerance",
                max,
                &format!("at least linear_tolerance ({min})"),
            )
            .into());
        }
    }

    let sources = book_sources(
        Backend::Malidrive,
        props.road_rule_book_file.as_ref(),
        props.phase_ring_book_file.as_ref(),
        props.intersection_book_file.as_ref(),
    );

    let mut configuration = BTreeMap::from([
        (
            "road_geometry_id".to_string(),
            MALIDRIVE_ROAD_GEOMETRY_ID.to_string(),
        ),
        (
            "opendrive_file".to_string(),
            opendrive_file.display().to_string(),
        ),
        (
            "angular_tolerance".to_string(),
            MALIDRIVE_ANGULAR_TOLERANCE.to_string(),
        ),
        (
            "scale_length".to_string(),
            MALIDRIVE_SCALE_LENGTH.to_string(),
        ),
        (
            "inertial_to_backend_frame_translation".to_string(),
            INERTIAL_TO_BACKEND_FRAME_TRANSLATION.to_string(),
        ),
        (
            "build_policy".to_string(),
            props.build_policy.as_str().to_string(),
        ),
        (
            "simplification_policy".to_string(),
            props.simplification_policy.as_str().to_string(),
        ),
        (
            "standard_strictness_policy".to_string(),
            props.standard_strictness_policy.to_string(),
        ),
        (
            "omit_nondrivable_lanes".to_string(),
            props.omit_nondrivable_lanes.to_string(),
        ),
    ]);
    if let Some(tolerance) = props.linear_tolerance {
        configuration.insert("linear_tolerance".to_string(), tolerance.to_string());
    }
    if let Some(tolerance) = props.max_linear_tolerance {
        configuration.insert("max_linear_tolerance".to_string(), tolerance.to_string());
    }
    if props.number_of_threads != 0 {
        configuration.insert(
            "num_threads".to_string(),
            props.number_of_threads.to_string(),
        );
    }
    insert_book_paths(&mut configuration, &sources);

    let mut loader = ConfigLoader::with_defaults();
    let loaded = loader.load_books(&sources)?;
    log_warnings(&loaded.warnings);

    let geometry = RoadGeometryInfo {
        id: MALIDRIVE_ROAD_GEOMETRY_ID.to_string(),
        backend: Backend::Malidrive,
        configuration,
    };
    Ok(build_road_network(geometry, &loaded.document)?)
}

/// Builds an OSM network.
///
/// Like malidrive, the OSM file must exist but is not parsed, and the
/// books come from their own files.
///
/// # Errors
///
/// Returns an error for an empty or missing OSM path, a non-positive
/// tolerance, or any error from loading the book files.
pub fn create_osm(props: &OsmBuildProperties) -> Result<RoadNetwork> {
    tracing::debug!("building osm road network");

    if props.osm_file.as_os_str().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "osm_file".to_string(),
            backend: Backend::Osm.to_string(),
        }
        .into());
    }
    let osm_file = existing_resource(Backend::Osm, &props.osm_file)?;
    check_positive("linear_tolerance", props.linear_tolerance)?;
    check_positive("angular_tolerance", props.angular_tolerance)?;

    let sources = book_sources(
        Backend::Osm,
        props.road_rule_book_file.as_ref(),
        props.phase_ring_book_file.as_ref(),
        props.intersection_book_file.as_ref(),
    );

    let mut configuration = BTreeMap::from([
        (
            "road_geometry_id".to_string(),
            OSM_ROAD_GEOMETRY_ID.to_string(),
        ),
        ("osm_file".to_string(), osm_file.display().to_string()),
        (
            "linear_tolerance".to_string(),
            props.linear_tolerance.to_string(),
        ),
        (
            "angular_tolerance".to_string(),
            props.angular_tolerance.to_string(),
        ),
        (
            "inertial_to_backend_frame_translation".to_string(),
            INERTIAL_TO_BACKEND_FRAME_TRANSLATION.to_string(),
        ),
        ("origin".to_string(), props.origin.to_string()),
    ]);
    insert_book_paths(&mut configuration, &sources);

    let mut loader = ConfigLoader::with_defaults();
    let loaded = loader.load_books(&sources)?;
    log_warnings(&loaded.warnings);

    let geometry = RoadGeometryInfo {
        id: OSM_ROAD_GEOMETRY_ID.to_string(),
        backend: Backend::Osm,
        configuration,
    };
    Ok(build_road_network(geometry, &loaded.document)?)
}

// ============================================================================
// Books
// ============================================================================

/// Turns a validated rules document into a road network.
///
/// Each ring starts in the `InitialPhase` of the first intersection that
/// names one for it, otherwise in its first declared phase. The next-phase
/// hint is the first declared successor of the starting phase.
///
/// # Errors
///
/// Returns a [`NetworkError`] if the document describes an inconsistent
/// network. Documents that passed validation do not.
pub fn build_road_network(
    geometry: RoadGeometryInfo,
    doc: &RulesDocument,
) -> std::result::Result<RoadNetwork, NetworkError> {
    let mut rulebook = RoadRulebook::new();
    for rule in &doc.discrete_value_rules {
        rulebook.add_discrete_value_rule(DiscreteValueRule {
            id: RuleId::new(rule.id.as_str()),
            values: rule.values.clone(),
        });
    }
    for rule in &doc.range_value_rules {
        rulebook.add_range_value_rule(RangeValueRule {
            id: RuleId::new(rule.id.as_str()),
            ranges: rule
                .ranges
                .iter()
                .map(|r| Range {
                    min: r.min,
                    max: r.max,
                    description: r.description.clone(),
                })
                .collect(),
        });
    }

    let mut phase_ring_book = ManualPhaseRingBook::new();
    for ring in &doc.phase_rings {
        let phases = ring
            .phases
            .iter()
            .map(|p| Phase {
                id: PhaseId::new(p.id.as_str()),
                discrete_value_rule_states: p
                    .discrete_value_rule_states
                    .iter()
                    .map(|(rule, state)| (RuleId::new(rule.as_str()), state.clone()))
                    .collect::<IndexMap<_, _>>(),
                bulb_states: p.bulb_states.clone(),
            })
            .collect();
        let transitions = ring
            .phase_transition_graph
            .iter()
            .map(|(from, next)| {
                (
                    PhaseId::new(from.as_str()),
                    next.iter()
                        .map(|n| NextPhase::new(n.id.as_str(), n.duration_until))
                        .collect(),
                )
            })
            .collect();
        phase_ring_book.add_phase_ring(PhaseRing::new(
            PhaseRingId::new(ring.id.as_str()),
            phases,
            transitions,
        )?)?;
    }

    let mut intersections = IntersectionBook::new();
    for intersection in &doc.intersections {
        let phase_ring_id = PhaseRingId::new(intersection.phase_ring.as_str());
        if phase_ring_book.phase_ring(&phase_ring_id).is_none() {
            return Err(NetworkError::UnknownPhaseRing(phase_ring_id.to_string()));
        }
        intersections.add_intersection(Intersection {
            id: IntersectionId::new(intersection.id.as_str()),
            phase_ring_id,
        })?;
    }

    let phase_provider = ManualPhaseProvider::new();
    for ring in phase_ring_book.iter() {
        let initial = doc
            .intersections
            .iter()
            .filter(|i| i.phase_ring == ring.id().as_str())
            .find_map(|i| i.initial_phase.as_deref())
            .map_or_else(|| ring.first_phase().id.clone(), PhaseId::new);
        let first_next = ring.next_phases(&initial)?.first();
        phase_provider.add_phase_ring(
            ring.id(),
            initial.clone(),
            first_next.map(|n| n.id.clone()),
            first_next.and_then(|n| n.duration_until),
        )?;
    }

    tracing::info!(
        road_geometry = %geometry.id,
        backend = %geometry.backend,
        phase_rings = phase_ring_book.len(),
        intersections = intersections.len(),
        "road network loaded"
    );

    Ok(RoadNetwork::new(
        geometry,
        rulebook,
        phase_ring_book,
        phase_provider,
        intersections,
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn existing_resource(backend: Backend, name: &Path) -> std::result::Result<PathBuf, ConfigError> {
    let path = get_resource(backend, name);
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::MissingFile { path })
    }
}

fn book_sources(
    backend: Backend,
    road_rule_book: Option<&PathBuf>,
    phase_ring_book: Option<&PathBuf>,
    intersection_book: Option<&PathBuf>,
) -> RuleSources {
    let resolve = |p: Option<&PathBuf>| p.map(|p| get_resource(backend, p));
    RuleSources {
        road_rule_book: resolve(road_rule_book),
        phase_ring_book: resolve(phase_ring_book),
        intersection_book: resolve(intersection_book),
    }
}

fn insert_book_paths(configuration: &mut BTreeMap<String, String>, sources: &RuleSources) {
    for (key, path) in [
        ("road_rule_book", &sources.road_rule_book),
        ("phase_ring_book", &sources.phase_ring_book),
        ("intersection_book", &sources.intersection_book),
    ] {
        if let Some(path) = path {
            configuration.insert(key.to_string(), path.display().to_string());
        }
    }
}

fn log_warnings(warnings: &[crate::config::LoadWarning]) {
    for warning in warnings {
        tracing::warn!("{warning}");
    }
}

fn invalid(field: &str, value: impl std::fmt::Display, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn check_positive(field: &str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "a positive number"))
    }
}

fn check_non_negative(field: &str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "a non-negative number"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapOrigin;
    use crate::error::RoadnetError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CROSSWALK: &str = r"
maliput_multilane_builder:
  id: crosswalk_network
DiscreteValueRules:
  - ID: Right-Of-Way/crosswalk
    Values: [Go, Stop]
PhaseRings:
  - ID: CrosswalkRing
    Phases:
      - ID: AllGoPhase
        DiscreteValueRuleStates:
          Right-Of-Way/crosswalk: Go
      - ID: AllStopPhase
        DiscreteValueRuleStates:
          Right-Of-Way/crosswalk: Stop
    PhaseTransitionGraph:
      AllGoPhase:
        - ID: AllStopPhase
          duration_until: 45
      AllStopPhase:
        - ID: AllGoPhase
          duration_until: 15
  - ID: StaticRing
    Phases:
      - ID: Frozen
Intersections:
  - ID: Crosswalk
    PhaseRing: CrosswalkRing
    InitialPhase: AllStopPhase
";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_dragway_defaults() {
        let network = create_dragway(&DragwayBuildProperties::default()).unwrap();
        assert_eq!(network.road_geometry().id, "Dragway with 2 lanes.");
        assert_eq!(network.road_geometry().backend, Backend::Dragway);
        assert_eq!(network.road_geometry().configuration["num_lanes"], "2");
        assert!(network.rulebook().is_empty());
        assert!(network.phase_ring_book().phase_rings().is_empty());
    }

    #[test]
    fn test_dragway_rejects_zero_lanes() {
        let props = DragwayBuildProperties {
            num_lanes: 0,
            ..DragwayBuildProperties::default()
        };
        let err = create_dragway(&props).unwrap_err();
        assert!(matches!(err, RoadnetError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_dragway_rejects_negative_shoulder() {
        let props = DragwayBuildProperties {
            shoulder_width: -1.0,
            ..DragwayBuildProperties::default()
        };
        assert!(create_dragway(&props).is_err());
    }

    #[test]
    fn test_multilane_requires_yaml_file() {
        let err = create_multilane(&MultilaneBuildProperties::default()).unwrap_err();
        assert!(matches!(
            err,
            RoadnetError::Config(ConfigError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_multilane_loads_rules_and_rings() {
        let file = write_temp(CROSSWALK);
        let network = create_multilane(&MultilaneBuildProperties {
            yaml_file: file.path().to_path_buf(),
        })
        .unwrap();

        assert_eq!(network.road_geometry().id, "crosswalk_network");
        assert_eq!(network.rulebook().discrete_value_rules().count(), 1);

        let rings: Vec<_> = network
            .phase_ring_book()
            .phase_rings()
            .into_iter()
            .map(|id| id.0)
            .collect();
        assert_eq!(rings, vec!["CrosswalkRing", "StaticRing"]);
        assert!(network.check_invariants().is_empty());
    }

    #[test]
    fn test_initial_phase_from_intersection() {
        let file = write_temp(CROSSWALK);
        let network = create_multilane(&MultilaneBuildProperties {
            yaml_file: file.path().to_path_buf(),
        })
        .unwrap();

        let state = network
            .phase_provider()
            .phase(&PhaseRingId::new("CrosswalkRing"))
            .unwrap();
        assert_eq!(state.state, PhaseId::new("AllStopPhase"));
        let next = state.next.unwrap();
        assert_eq!(next.state, PhaseId::new("AllGoPhase"));
        assert_eq!(next.duration_until, Some(15.0));
    }

    #[test]
    fn test_ring_without_transitions_has_no_next() {
        let file = write_temp(CROSSWALK);
        let network = create_multilane(&MultilaneBuildProperties {
            yaml_file: file.path().to_path_buf(),
        })
        .unwrap();

        let state = network
            .phase_provider()
            .phase(&PhaseRingId::new("StaticRing"))
            .unwrap();
        assert_eq!(state.state, PhaseId::new("Frozen"));
        assert!(state.next.is_none());
    }

    #[test]
    fn test_multilane_default_geometry_id() {
        let file = write_temp("PhaseRings: []\n");
        let network = create_multilane(&MultilaneBuildProperties {
            yaml_file: file.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(network.road_geometry().id, "multilane");
    }

    #[test]
    fn test_malidrive_requires_existing_xodr() {
        let err = create_malidrive(&MalidriveBuildProperties::default()).unwrap_err();
        assert!(matches!(
            err,
            RoadnetError::Config(ConfigError::MissingRequired { .. })
        ));

        let props = MalidriveBuildProperties {
            xodr_file_path: PathBuf::from("/nonexistent/town.xodr"),
            ..MalidriveBuildProperties::default()
        };
        let err = create_malidrive(&props).unwrap_err();
        assert!(matches!(err, RoadnetError::Config(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_malidrive_tolerance_order() {
        let xodr = write_temp("<OpenDRIVE/>");
        let props = MalidriveBuildProperties {
            xodr_file_path: xodr.path().to_path_buf(),
            linear_tolerance: Some(0.5),
            max_linear_tolerance: Some(0.1),
            ..MalidriveBuildProperties::default()
        };
        let err = create_malidrive(&props).unwrap_err();
        assert!(err.to_string().contains("max_linear_tolerance"));
    }

    #[test]
    fn test_malidrive_configuration_and_books() {
        let xodr = write_temp("<OpenDRIVE/>");
        let rules = write_temp(CROSSWALK);
        let props = MalidriveBuildProperties {
            xodr_file_path: xodr.path().to_path_buf(),
            linear_tolerance: Some(0.05),
            number_of_threads: 4,
            phase_ring_book_file: Some(rules.path().to_path_buf()),
            ..MalidriveBuildProperties::default()
        };
        let network = create_malidrive(&props).unwrap();
        let config = &network.road_geometry().configuration;

        assert_eq!(network.road_geometry().id, "malidrive_rg");
        assert_eq!(config["road_geometry_id"], "malidrive_rg");
        assert_eq!(config["linear_tolerance"], "0.05");
        assert_eq!(config["num_threads"], "4");
        assert_eq!(config["build_policy"], "sequential");
        assert_eq!(config["simplification_policy"], "none");
        assert_eq!(config["standard_strictness_policy"], "permissive");
        assert_eq!(config["omit_nondrivable_lanes"], "false");
        assert_eq!(config["angular_tolerance"], "0.001");
        assert_eq!(config["scale_length"], "1");
        assert_eq!(config["inertial_to_backend_frame_translation"], "{0., 0., 0.}");
        assert!(config.contains_key("phase_ring_book"));
        assert!(!config.contains_key("max_linear_tolerance"));
        assert!(!config.contains_key("intersection_book"));

        // Only the phase ring section was taken from the rules file.
        assert!(network.rulebook().is_empty());
        assert!(network.intersections().is_empty());
        assert_eq!(network.phase_ring_book().phase_rings().len(), 2);
    }

    #[test]
    fn test_load_road_network_dispatches_on_backend() {
        let network = load_road_network(
            Backend::Dragway,
            &DragwayBuildProperties {
                num_lanes: 3,
                ..DragwayBuildProperties::default()
            },
            &MultilaneBuildProperties::default(),
            &MalidriveBuildProperties::default(),
            &OsmBuildProperties::default(),
        )
        .unwrap();
        assert_eq!(network.road_geometry().id, "Dragway with 3 lanes.");
    }

    #[test]
    fn test_osm_requires_existing_file() {
        let err = create_osm(&OsmBuildProperties::default()).unwrap_err();
        assert!(matches!(
            err,
            RoadnetError::Config(ConfigError::MissingRequired { .. })
        ));

        let props = OsmBuildProperties {
            osm_file: PathBuf::from("/nonexistent/circuit.osm"),
            ..OsmBuildProperties::default()
        };
        let err = create_osm(&props).unwrap_err();
        assert!(matches!(err, RoadnetError::Config(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_osm_rejects_non_positive_tolerance() {
        let osm = write_temp("<osm/>");
        let props = OsmBuildProperties {
            osm_file: osm.path().to_path_buf(),
            angular_tolerance: 0.0,
            ..OsmBuildProperties::default()
        };
        let err = create_osm(&props).unwrap_err();
        assert!(err.to_string().contains("angular_tolerance"));
    }

    #[test]
    fn test_osm_configuration_and_books() {
        let osm = write_temp("<osm/>");
        let rules = write_temp(CROSSWALK);
        let props = OsmBuildProperties {
            osm_file: osm.path().to_path_buf(),
            origin: MapOrigin {
                lat: 37.4,
                lon: -122.1,
            },
            intersection_book_file: Some(rules.path().to_path_buf()),
            phase_ring_book_file: Some(rules.path().to_path_buf()),
            ..OsmBuildProperties::default()
        };
        let network = load_road_network(
            Backend::Osm,
            &DragwayBuildProperties::default(),
            &MultilaneBuildProperties::default(),
            &MalidriveBuildProperties::default(),
            &props,
        )
        .unwrap();
        let config = &network.road_geometry().configuration;

        assert_eq!(network.road_geometry().id, "maliput_osm_rg");
        assert_eq!(network.road_geometry().backend, Backend::Osm);
        assert_eq!(config["road_geometry_id"], "maliput_osm_rg");
        assert_eq!(config["osm_file"], osm.path().display().to_string());
        assert_eq!(config["linear_tolerance"], "0.05");
        assert_eq!(config["angular_tolerance"], "0.001");
        assert_eq!(config["origin"], "{37.4, -122.1}");
        assert!(config.contains_key("intersection_book"));
        assert!(!config.contains_key("road_rule_book"));

        let state = network
            .intersection_phase(&IntersectionId::new("Crosswalk"))
            .unwrap();
        assert_eq!(state.state, PhaseId::new("AllStopPhase"));
        assert!(network.check_invariants().is_empty());
    }

    #[test]
    fn test_get_resource_absolute_unchanged() {
        let path = Path::new("/abs/town.xodr");
        assert_eq!(get_resource(Backend::Malidrive, path), path);
    }

    #[test]
    fn test_get_resource_missing_falls_back_to_name() {
        let path = Path::new("definitely_not_a_resource_4821.yaml");
        assert_eq!(get_resource(Backend::Multilane, path), path);
        assert_eq!(get_resource(Backend::Dragway, path), path);
        assert_eq!(get_resource(Backend::Osm, path), path);
    }
}
