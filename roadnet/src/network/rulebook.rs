//! Road rule book.
//!
//! Holds the discrete and range value rules of a road network. Rules are
//! kept in declaration order. Rule semantics (zones, severities, related
//! rules) are not modelled; a rule is its id and its possible states.

use indexmap::IndexMap;
use serde::Serialize;

use super::ids::RuleId;

/// A rule whose state is one of a set of named values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscreteValueRule {
    /// Rule identifier.
    pub id: RuleId,
    /// Possible values, in declaration order.
    pub values: Vec<String>,
}

impl DiscreteValueRule {
    /// A rule with exactly one possible value never changes.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.values.len() == 1
    }
}

/// A numeric interval state of a range value rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Human-readable description.
    pub description: String,
}

/// A rule whose state is one of a set of numeric ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeValueRule {
    /// Rule identifier.
    pub id: RuleId,
    /// Possible ranges, in declaration order.
    pub ranges: Vec<Range>,
}

impl RangeValueRule {
    /// A rule with exactly one possible range never changes.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.ranges.len() == 1
    }
}

/// Collection of the road network's rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadRulebook {
    discrete_value_rules: IndexMap<RuleId, DiscreteValueRule>,
    range_value_rules: IndexMap<RuleId, RangeValueRule>,
}

impl RoadRulebook {
    /// Creates an empty rule book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a discrete value rule, replacing any rule with the same id.
    pub fn add_discrete_value_rule(&mut self, rule: DiscreteValueRule) {
        self.discrete_value_rules.insert(rule.id.clone(), rule);
    }

    /// Adds a range value rule, replacing any rule with the same id.
    pub fn add_range_value_rule(&mut self, rule: RangeValueRule) {
        self.range_value_rules.insert(rule.id.clone(), rule);
    }

    /// Returns the discrete value rule with the given id.
    #[must_use]
    pub fn discrete_value_rule(&self, id: &RuleId) -> Option<&DiscreteValueRule> {
        self.discrete_value_rules.get(id)
    }

    /// Returns the range value rule with the given id.
    #[must_use]
    pub fn range_value_rule(&self, id: &RuleId) -> Option<&RangeValueRule> {
        self.range_value_rules.get(id)
    }

    /// Returns all discrete value rules.
    pub fn discrete_value_rules(&self) -> impl Iterator<Item = &DiscreteValueRule> {
        self.discrete_value_rules.values()
    }

    /// Returns all range value rules.
    pub fn range_value_rules(&self) -> impl Iterator<Item = &RangeValueRule> {
        self.range_value_rules.values()
    }

    /// Returns the discrete value rules with a single possible value.
    pub fn static_discrete_value_rules(&self) -> impl Iterator<Item = &DiscreteValueRule> {
        self.discrete_value_rules().filter(|r| r.is_static())
    }

    /// Returns the range value rules with a single possible range.
    pub fn static_range_value_rules(&self) -> impl Iterator<Item = &RangeValueRule> {
        self.range_value_rules().filter(|r| r.is_static())
    }

    /// Returns true when the book holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discrete_value_rules.is_empty() && self.range_value_rules.is_empty()
    }
}
