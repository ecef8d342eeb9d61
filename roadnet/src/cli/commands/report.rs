//! Printable views of a road network shared by the commands.

use std::io::{self, Write};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::BulbState;
use crate::error::NetworkError;
use crate::network::{NextPhaseState, PhaseId, PhaseRingId, RoadNetwork, RoadRulebook, RuleId};

/// A discrete value rule with a single possible state.
#[derive(Debug, Serialize)]
pub struct StaticDiscreteRule<'a> {
    pub id: &'a RuleId,
    pub state: &'a str,
}

/// A range value rule with a single possible range.
#[derive(Debug, Serialize)]
pub struct StaticRangeRule<'a> {
    pub id: &'a RuleId,
    pub min: f64,
    pub max: f64,
}

/// Rules whose state never changes.
#[derive(Debug, Serialize)]
pub struct StaticRules<'a> {
    pub discrete_value_rules: Vec<StaticDiscreteRule<'a>>,
    pub range_value_rules: Vec<StaticRangeRule<'a>>,
}

impl<'a> StaticRules<'a> {
    /// Collects the static rules of a rule book.
    #[must_use]
    pub fn collect(rulebook: &'a RoadRulebook) -> Self {
        let discrete_value_rules = rulebook
            .static_discrete_value_rules()
            .filter_map(|rule| {
                rule.values.first().map(|state| StaticDiscreteRule {
                    id: &rule.id,
                    state,
                })
            })
            .collect();
        let range_value_rules = rulebook
            .static_range_value_rules()
            .filter_map(|rule| {
                rule.ranges.first().map(|range| StaticRangeRule {
                    id: &rule.id,
                    min: range.min,
                    max: range.max,
                })
            })
            .collect();
        Self {
            discrete_value_rules,
            range_value_rules,
        }
    }

    /// Writes the human-readable listing.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_human(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Static DiscreteValueRules")?;
        for rule in &self.discrete_value_rules {
            writeln!(out, "\tDiscrete Value Rule: {} | State: {}", rule.id, rule.state)?;
        }
        writeln!(out, "Static RangeValueRules")?;
        for rule in &self.range_value_rules {
            writeln!(
                out,
                "\tRange Value Rule: {} | State: [{}, {}]",
                rule.id, rule.min, rule.max
            )?;
        }
        Ok(())
    }
}

/// Current state of one phase ring with the rule and bulb states its
/// phase imposes.
#[derive(Debug, Serialize)]
pub struct RingReport<'a> {
    pub id: PhaseRingId,
    pub phase: PhaseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NextPhaseState>,
    pub discrete_value_rule_states: &'a IndexMap<RuleId, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulb_states: Option<&'a IndexMap<String, BulbState>>,
}

impl RingReport<'_> {
    /// Writes the human-readable listing.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_human(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "PhaseRingId: {} | Current Phase: {}", self.id, self.phase)?;
        for (rule, state) in self.discrete_value_rule_states {
            writeln!(out, "\tDiscrete Value Rule: {rule} | State: {state}")?;
        }
        for (bulb, state) in self.bulb_states.into_iter().flatten() {
            writeln!(out, "\tBulbUniqueId: {bulb} | State: {state}")?;
        }
        Ok(())
    }
}

/// Reports the current state of every phase ring, in ring id order.
///
/// # Errors
///
/// Fails when a ring is not tracked by the phase provider or is in a
/// phase its ring does not declare.
pub fn ring_reports(network: &RoadNetwork) -> Result<Vec<RingReport<'_>>, NetworkError> {
    let book = network.phase_ring_book();
    book.phase_rings()
        .into_iter()
        .map(|id| {
            let ring = book
                .phase_ring(&id)
                .ok_or_else(|| NetworkError::UnknownPhaseRing(id.to_string()))?;
            let state = network
                .phase_provider()
                .phase(&id)
                .ok_or_else(|| NetworkError::UntrackedPhaseRing(id.to_string()))?;
            let phase = ring
                .phase(&state.state)
                .ok_or_else(|| NetworkError::UnknownPhase {
                    ring: id.to_string(),
                    phase: state.state.to_string(),
                })?;
            Ok(RingReport {
                id,
                phase: state.state,
                next: state.next,
                discrete_value_rule_states: &phase.discrete_value_rule_states,
                bulb_states: phase.bulb_states.as_ref(),
            })
        })
        .collect()
}
