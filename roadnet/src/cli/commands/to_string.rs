//! `to-string` command.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ToStringArgs};
use crate::error::RoadnetError;
use crate::network::{
    DiscreteValueRule, Intersection, RangeValueRule, RoadGeometryInfo, RoadNetwork,
};

use super::load_network;
use super::report::{RingReport, ring_reports};

/// Item counts of a road network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub discrete_value_rules: usize,
    pub range_value_rules: usize,
    pub phase_rings: usize,
    pub intersections: usize,
}

/// What `to-string` prints, filtered by the `--include-*` flags.
#[derive(Debug, Serialize)]
pub struct NetworkSummary<'a> {
    pub road_geometry_id: &'a str,
    pub backend: String,
    pub counts: Counts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road_geometry: Option<&'a RoadGeometryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrete_value_rules: Option<Vec<&'a DiscreteValueRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_value_rules: Option<Vec<&'a RangeValueRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_rings: Option<Vec<RingReport<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersections: Option<Vec<&'a Intersection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invariant_violations: Option<Vec<String>>,
}

impl<'a> NetworkSummary<'a> {
    /// Collects the sections requested by `args`.
    ///
    /// # Errors
    ///
    /// Fails when phase rings are requested and the phase state is
    /// inconsistent with the ring book.
    pub fn collect(network: &'a RoadNetwork, args: &ToStringArgs) -> Result<Self, RoadnetError> {
        let rulebook = network.rulebook();
        let counts = Counts {
            discrete_value_rules: rulebook.discrete_value_rules().count(),
            range_value_rules: rulebook.range_value_rules().count(),
            phase_rings: network.phase_ring_book().phase_rings().len(),
            intersections: network.intersections().len(),
        };

        let invariant_violations = args.check_invariants.then(|| {
            tracing::info!("checking invariants");
            let violations = network.check_invariants();
            if violations.is_empty() {
                tracing::info!("no invariant violations were found");
            } else {
                tracing::warn!(count = violations.len(), "invariant violations were found");
                for violation in &violations {
                    tracing::warn!("{violation}");
                }
            }
            violations
        });

        let phase_rings = if args.include_phase_rings {
            Some(ring_reports(network)?)
        } else {
            None
        };

        Ok(Self {
            road_geometry_id: &network.road_geometry().id,
            backend: network.road_geometry().backend.to_string(),
            counts,
            road_geometry: args
                .include_road_geometry_id
                .then(|| network.road_geometry()),
            discrete_value_rules: args
                .include_rules
                .then(|| rulebook.discrete_value_rules().collect()),
            range_value_rules: args
                .include_rules
                .then(|| rulebook.range_value_rules().collect()),
            phase_rings,
            intersections: args
                .include_intersections
                .then(|| network.intersections().iter().collect()),
            invariant_violations,
        })
    }

    /// Writes the human-readable listing. `labels` prefixes each line
    /// with the type of the item it describes.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_human(&self, out: &mut impl Write, labels: bool) -> io::Result<()> {
        let label = |name: &str| {
            if labels {
                format!("[{name}] ")
            } else {
                String::new()
            }
        };

        writeln!(
            out,
            "{}{} ({}): {} discrete value rules, {} range value rules, {} phase rings, {} intersections",
            label("RoadNetwork"),
            self.road_geometry_id,
            self.backend,
            self.counts.discrete_value_rules,
            self.counts.range_value_rules,
            self.counts.phase_rings,
            self.counts.intersections,
        )?;

        if let Some(geometry) = self.road_geometry {
            writeln!(out, "{}id: {}", label("RoadGeometry"), geometry.id)?;
            for (key, value) in &geometry.configuration {
                writeln!(out, "\t{key}: {value}")?;
            }
        }

        for rule in self.discrete_value_rules.iter().flatten() {
            writeln!(
                out,
                "{}{} | Values: [{}]",
                label("DiscreteValueRule"),
                rule.id,
                rule.values.join(", ")
            )?;
        }

        for rule in self.range_value_rules.iter().flatten() {
            let ranges: Vec<String> = rule
                .ranges
                .iter()
                .map(|r| format!("[{}, {}]", r.min, r.max))
                .collect();
            writeln!(
                out,
                "{}{} | Ranges: {}",
                label("RangeValueRule"),
                rule.id,
                ranges.join(", ")
            )?;
        }

        for ring in self.phase_rings.iter().flatten() {
            if labels {
                write!(out, "{}", label("PhaseRing"))?;
            }
            ring.write_human(out)?;
        }

        for intersection in self.intersections.iter().flatten() {
            writeln!(
                out,
                "{}{} | PhaseRing: {}",
                label("Intersection"),
                intersection.id,
                intersection.phase_ring_id
            )?;
        }

        Ok(())
    }
}

/// Run the `to-string` command.
///
/// # Errors
///
/// Returns a config error when the network fails to load, a network error
/// when its phase state cannot be reported, or an I/O error on write
/// failure.
pub fn run(args: &ToStringArgs) -> Result<(), RoadnetError> {
    let network = load_network(&args.backend)?;
    let summary = NetworkSummary::collect(&network, args)?;
    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Human => summary.write_human(&mut stdout, args.include_type_labels)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &summary)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
