//! Metric record model - one measured evaluator or rule.

use serde::{Deserialize, Serialize};

/// Measurement domain a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Pattern-based field extraction evaluated against every event.
    FieldEvaluator,
    /// Correlation rule tested against every event.
    CorrelationRule,
}

impl Domain {
    /// Canonical cost unit for this domain.
    pub fn unit(self) -> CostUnit {
        match self {
            Domain::FieldEvaluator => CostUnit::Nanoseconds,
            Domain::CorrelationRule => CostUnit::Milliseconds,
        }
    }

    /// Short machine-friendly name, used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            Domain::FieldEvaluator => "properties",
            Domain::CorrelationRule => "rules",
        }
    }

    /// Plural noun for the measured entities.
    pub fn noun(self) -> &'static str {
        match self {
            Domain::FieldEvaluator => "custom properties",
            Domain::CorrelationRule => "rules",
        }
    }

    /// Human readable title.
    pub fn title(self) -> &'static str {
        match self {
            Domain::FieldEvaluator => "Expensive Custom Properties",
            Domain::CorrelationRule => "Expensive Rules",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::FieldEvaluator => f.write_str("field evaluator"),
            Domain::CorrelationRule => f.write_str("correlation rule"),
        }
    }
}

/// Unit a domain's costs are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostUnit {
    /// Nanoseconds
    Nanoseconds,
    /// Milliseconds
    Milliseconds,
}

impl CostUnit {
    /// How many of this unit make up one millisecond.
    pub fn per_millisecond(self) -> f64 {
        match self {
            CostUnit::Nanoseconds => 1_000_000.0,
            CostUnit::Milliseconds => 1.0,
        }
    }

    /// Convert a value in this unit to milliseconds.
    pub fn to_millis(self, value: f64) -> f64 {
        value / self.per_millisecond()
    }

    /// Convert milliseconds to this unit.
    pub fn from_millis(self, millis: f64) -> f64 {
        millis * self.per_millisecond()
    }

    /// Unit symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            CostUnit::Nanoseconds => "ns",
            CostUnit::Milliseconds => "ms",
        }
    }
}

/// Display-only identity of a measured entity.
///
/// Nothing in the diagnostics depends on these strings except the
/// building-block marker lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name
    pub name: String,

    /// Platform identifier, when the export carries one
    pub id: Option<String>,

    /// Grouping (rule folder)
    pub group: Option<String>,

    /// Raw MBean key
    pub mbean: String,
}

impl Identity {
    /// Create an identity with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the name or the group contains `marker`.
    pub fn mentions(&self, marker: &str) -> bool {
        if marker.is_empty() {
            return false;
        }
        self.name.contains(marker)
            || self.group.as_deref().is_some_and(|g| g.contains(marker))
    }
}

/// Timing figures, all in the domain's canonical unit.
///
/// `min <= average <= max` is not guaranteed by the exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostStats {
    /// Average cost per evaluation
    pub average: f64,
    /// Longest observed evaluation
    pub max: f64,
    /// Shortest observed evaluation
    pub min: f64,
}

/// Counters specific to field evaluators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldEvaluatorStats {
    /// Extraction pattern (may be empty)
    pub pattern: String,
    /// Times the evaluator ran
    pub call_count: u64,
    /// Evaluator cancellations (timeouts)
    pub failure_count: u64,
}

/// Counters specific to correlation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRuleStats {
    /// Times the rule was tested
    pub test_count: u64,
    /// Times the rule fired
    pub fired_count: u64,
    /// Events-per-second ceiling implied by the rule; 0 when not reported
    pub capacity_eps: f64,
    /// Accumulated test time in seconds
    pub total_test_seconds: f64,
    /// Responses generated by the rule
    pub response_count: u64,
}

/// Domain-dependent part of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum Signals {
    /// Field evaluator counters
    FieldEvaluator(FieldEvaluatorStats),
    /// Correlation rule counters
    CorrelationRule(CorrelationRuleStats),
}

/// One measured entity, as produced by the ingest adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Who this record describes
    pub identity: Identity,

    /// Timing figures
    pub cost: CostStats,

    /// Domain counters
    pub signals: Signals,

    /// Which input produced this record
    pub source_label: String,
}

impl MetricRecord {
    /// Build a field evaluator record.
    pub fn field_evaluator(
        identity: Identity,
        cost: CostStats,
        stats: FieldEvaluatorStats,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            cost,
            signals: Signals::FieldEvaluator(stats),
            source_label: source_label.into(),
        }
    }

    /// Build a correlation rule record.
    pub fn correlation_rule(
        identity: Identity,
        cost: CostStats,
        stats: CorrelationRuleStats,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            cost,
            signals: Signals::CorrelationRule(stats),
            source_label: source_label.into(),
        }
    }

    /// Domain of this record.
    pub fn domain(&self) -> Domain {
        match self.signals {
            Signals::FieldEvaluator(_) => Domain::FieldEvaluator,
            Signals::CorrelationRule(_) => Domain::CorrelationRule,
        }
    }

    /// Times evaluated (field evaluators) or tested (rules).
    pub fn volume(&self) -> u64 {
        match &self.signals {
            Signals::FieldEvaluator(s) => s.call_count,
            Signals::CorrelationRule(s) => s.test_count,
        }
    }

    /// Cancellations. Rules never report failures.
    pub fn failure_count(&self) -> u64 {
        match &self.signals {
            Signals::FieldEvaluator(s) => s.failure_count,
            Signals::CorrelationRule(_) => 0,
        }
    }

    /// Whether the record carries a failure signal.
    pub fn has_failure(&self) -> bool {
        self.failure_count() > 0
    }

    /// Rule firings, if this is a rule.
    pub fn fired_count(&self) -> Option<u64> {
        match &self.signals {
            Signals::FieldEvaluator(_) => None,
            Signals::CorrelationRule(s) => Some(s.fired_count),
        }
    }

    /// Extraction pattern, if any and non-empty.
    pub fn pattern(&self) -> Option<&str> {
        match &self.signals {
            Signals::FieldEvaluator(s) if !s.pattern.is_empty() => Some(&s.pattern),
            _ => None,
        }
    }

    /// Capacity ceiling in events per second; 0 when unknown.
    pub fn capacity_eps(&self) -> f64 {
        match &self.signals {
            Signals::FieldEvaluator(_) => 0.0,
            Signals::CorrelationRule(s) => s.capacity_eps,
        }
    }

    /// Accumulated test time in seconds; 0 for field evaluators.
    pub fn total_cost_seconds(&self) -> f64 {
        match &self.signals {
            Signals::FieldEvaluator(_) => 0.0,
            Signals::CorrelationRule(s) => s.total_test_seconds,
        }
    }
}
