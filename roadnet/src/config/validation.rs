//! Rules document validation.
//!
//! Runs on a fully deserialized [`RulesDocument`] and collects every
//! problem instead of stopping at the first one. Errors prevent the
//! document from being turned into a road network; warnings are reported
//! and loading continues.

use std::collections::{HashMap, HashSet};

use crate::config::loader::ConfigLimits;
use crate::config::{PhaseRingConfig, RulesDocument, suggest};
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of rules validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Rules document validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a rules document and returns every issue found.
    pub fn validate(&mut self, doc: &RulesDocument, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_discrete_value_rules(doc);
        self.validate_range_value_rules(doc);
        self.validate_phase_rings(doc);
        self.validate_intersections(doc);
        self.validate_limits(doc, limits);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Rules
    // ========================================================================

    fn validate_discrete_value_rules(&mut self, doc: &RulesDocument) {
        let mut seen = HashSet::new();
        for (i, rule) in doc.discrete_value_rules.iter().enumerate() {
            let path = format!("DiscreteValueRules[{i}]");
            if rule.id.is_empty() {
                self.add_error(&format!("{path}.ID"), "Rule ID cannot be empty");
            } else if !seen.insert(rule.id.as_str()) {
                self.add_error(
                    &format!("{path}.ID"),
                    &format!("Duplicate discrete value rule '{}'", rule.id),
                );
            }

            if rule.values.is_empty() {
                self.add_error(
                    &format!("{path}.Values"),
                    "A discrete value rule needs at least one value",
                );
            }

            let mut values = HashSet::new();
            for (j, value) in rule.values.iter().enumerate() {
                if !values.insert(value.as_str()) {
                    self.add_warning(
                        &format!("{path}.Values[{j}]"),
                        &format!("Value '{value}' is listed more than once"),
                    );
                }
            }
        }
    }

    fn validate_range_value_rules(&mut self, doc: &RulesDocument) {
        let mut seen = HashSet::new();
        for (i, rule) in doc.range_value_rules.iter().enumerate() {
            let path = format!("RangeValueRules[{i}]");
            if rule.id.is_empty() {
                self.add_error(&format!("{path}.ID"), "Rule ID cannot be empty");
            } else if !seen.insert(rule.id.as_str()) {
                self.add_error(
                    &format!("{path}.ID"),
                    &format!("Duplicate range value rule '{}'", rule.id),
                );
            }

            if rule.ranges.is_empty() {
                self.add_error(
                    &format!("{path}.Ranges"),
                    "A range value rule needs at least one range",
                );
            }

            for (j, range) in rule.ranges.iter().enumerate() {
                let range_path = format!("{path}.Ranges[{j}]");
                if !range.min.is_finite() || !range.max.is_finite() {
                    self.add_error(&range_path, "Range bounds must be finite numbers");
                } else if range.min > range.max {
                    self.add_error(
                        &range_path,
                        &format!("Range min {} is greater than max {}", range.min, range.max),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Phase Rings
    // ========================================================================

    fn validate_phase_rings(&mut self, doc: &RulesDocument) {
        let discrete_rules: HashMap<&str, &[String]> = doc
            .discrete_value_rules
            .iter()
            .map(|r| (r.id.as_str(), r.values.as_slice()))
            .collect();

        let mut seen = HashSet::new();
        for (i, ring) in doc.phase_rings.iter().enumerate() {
            let path = format!("PhaseRings[{i}]");
            if ring.id.is_empty() {
                self.add_error(&format!("{path}.ID"), "Phase ring ID cannot be empty");
            } else if !seen.insert(ring.id.as_str()) {
                self.add_error(
                    &format!("{path}.ID"),
                    &format!("Duplicate phase ring '{}'", ring.id),
                );
            }

            self.validate_phases(ring, &path, &discrete_rules);
            self.validate_transition_graph(ring, &path);
        }
    }

    fn validate_phases(
        &mut self,
        ring: &PhaseRingConfig,
        path: &str,
        discrete_rules: &HashMap<&str, &[String]>,
    ) {
        if ring.phases.is_empty() {
            self.add_error(
                &format!("{path}.Phases"),
                "A phase ring needs at least one phase",
            );
            return;
        }

        let mut seen = HashSet::new();
        for (j, phase) in ring.phases.iter().enumerate() {
            let phase_path = format!("{path}.Phases[{j}]");
            if phase.id.is_empty() {
                self.add_error(&format!("{phase_path}.ID"), "Phase ID cannot be empty");
            } else if !seen.insert(phase.id.as_str()) {
                self.add_error(
                    &format!("{phase_path}.ID"),
                    &format!("Duplicate phase '{}' in ring '{}'", phase.id, ring.id),
                );
            }

            // Rule states may target a rule book loaded from another file.
            if discrete_rules.is_empty() {
                continue;
            }
            for (rule_id, state) in &phase.discrete_value_rule_states {
                let rule_path = format!("{phase_path}.DiscreteValueRuleStates.{rule_id}");
                match discrete_rules.get(rule_id.as_str()) {
                    None => {
                        let hint = suggest(rule_id, discrete_rules.keys().copied())
                            .map_or_else(String::new, |s| format!(". Did you mean '{s}'?"));
                        self.add_warning(
                            &rule_path,
                            &format!("Unknown discrete value rule '{rule_id}'{hint}"),
                        );
                    }
                    Some(values) if !values.iter().any(|v| v == state) => {
                        self.add_warning(
                            &rule_path,
                            &format!("'{state}' is not a value of rule '{rule_id}'"),
                        );
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn validate_transition_graph(&mut self, ring: &PhaseRingConfig, path: &str) {
        let phases: Vec<&str> = ring.phases.iter().map(|p| p.id.as_str()).collect();
        let mut has_transitions = false;

        for (from, successors) in &ring.phase_transition_graph {
            let from_path = format!("{path}.PhaseTransitionGraph.{from}");
            if !phases.contains(&from.as_str()) {
                self.add_error(&from_path, &unknown_phase(from, &ring.id, &phases));
            }

            let mut targets = HashSet::new();
            for (k, next) in successors.iter().enumerate() {
                has_transitions = true;
                let next_path = format!("{from_path}[{k}]");
                if !phases.contains(&next.id.as_str()) {
                    self.add_error(
                        &format!("{next_path}.ID"),
                        &unknown_phase(&next.id, &ring.id, &phases),
                    );
                }
                if !targets.insert(next.id.as_str()) {
                    self.add_error(
                        &format!("{next_path}.ID"),
                        &format!("Transition from '{from}' to '{}' is declared twice", next.id),
                    );
                }
                if let Some(duration) = next.duration_until {
                    if !duration.is_finite() || duration < 0.0 {
                        self.add_error(
                            &format!("{next_path}.duration_until"),
                            &format!("duration_until must be a non-negative number, got {duration}"),
                        );
                    }
                }
            }
        }

        if !has_transitions && !ring.phases.is_empty() {
            self.add_warning(
                path,
                &format!("Phase ring '{}' has no transitions and will never change", ring.id),
            );
        }
    }

    // ========================================================================
    // Intersections
    // ========================================================================

    fn validate_intersections(&mut self, doc: &RulesDocument) {
        let rings: HashMap<&str, &PhaseRingConfig> = doc
            .phase_rings
            .iter()
            .map(|r| (r.id.as_str(), r))
            .collect();

        let mut seen = HashSet::new();
        for (i, intersection) in doc.intersections.iter().enumerate() {
            let path = format!("Intersections[{i}]");
            if intersection.id.is_empty() {
                self.add_error(&format!("{path}.ID"), "Intersection ID cannot be empty");
            } else if !seen.insert(intersection.id.as_str()) {
                self.add_error(
                    &format!("{path}.ID"),
                    &format!("Duplicate intersection '{}'", intersection.id),
                );
            }

            let Some(ring) = rings.get(intersection.phase_ring.as_str()) else {
                let hint = suggest(&intersection.phase_ring, rings.keys().copied())
                    .map_or_else(String::new, |s| format!(". Did you mean '{s}'?"));
                self.add_error(
                    &format!("{path}.PhaseRing"),
                    &format!("Unknown phase ring '{}'{hint}", intersection.phase_ring),
                );
                continue;
            };

            if let Some(initial) = &intersection.initial_phase {
                let phases: Vec<&str> = ring.phases.iter().map(|p| p.id.as_str()).collect();
                if !phases.contains(&initial.as_str()) {
                    self.add_error(
                        &format!("{path}.InitialPhase"),
                        &unknown_phase(initial, &ring.id, &phases),
                    );
                }
            }
        }

        let mut initial_phases: HashMap<&str, HashSet<&str>> = HashMap::new();
        for intersection in &doc.intersections {
            if let Some(initial) = intersection.initial_phase.as_deref() {
                initial_phases
                    .entry(intersection.phase_ring.as_str())
                    .or_default()
                    .insert(initial);
            }
        }
        let mut conflicting: Vec<&str> = initial_phases
            .into_iter()
            .filter(|(_, phases)| phases.len() > 1)
            .map(|(ring, _)| ring)
            .collect();
        conflicting.sort_unstable();
        for ring in conflicting {
            self.add_warning(
                "Intersections",
                &format!(
                    "Intersections sharing phase ring '{ring}' declare different initial phases; the first one wins"
                ),
            );
        }
    }

    // ========================================================================
    // Limits
    // ========================================================================

    fn validate_limits(&mut self, doc: &RulesDocument, limits: &ConfigLimits) {
        if doc.phase_rings.len() > limits.max_phase_rings {
            self.add_error(
                "PhaseRings",
                &format!(
                    "Too many phase rings: {} (max {})",
                    doc.phase_rings.len(),
                    limits.max_phase_rings
                ),
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

fn unknown_phase(phase: &str, ring: &str, phases: &[&str]) -> String {
    let hint = suggest(phase, phases.iter().copied())
        .map_or_else(String::new, |s| format!(". Did you mean '{s}'?"));
    format!("Unknown phase '{phase}' in ring '{ring}'{hint}")
}

// ============================================================================
// Tests
// ============================================================================
