//! Severity bands and the threshold tables that define them.

use serde::{Deserialize, Serialize};

use crate::record::Domain;

/// Cost severity band, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityBand {
    /// At or above the critical bound
    Critical,
    /// At or above the high bound
    High,
    /// At or above the medium bound
    Medium,
    /// Everything cheaper
    Low,
}

impl SeverityBand {
    /// All bands in rank order.
    pub const ALL: [SeverityBand; 4] = [
        SeverityBand::Critical,
        SeverityBand::High,
        SeverityBand::Medium,
        SeverityBand::Low,
    ];

    /// Ordinal position, 0 = CRITICAL.
    pub fn rank(self) -> u8 {
        match self {
            SeverityBand::Critical => 0,
            SeverityBand::High => 1,
            SeverityBand::Medium => 2,
            SeverityBand::Low => 3,
        }
    }

    /// Upper-case label.
    pub fn label(self) -> &'static str {
        match self {
            SeverityBand::Critical => "CRITICAL",
            SeverityBand::High => "HIGH",
            SeverityBand::Medium => "MEDIUM",
            SeverityBand::Low => "LOW",
        }
    }
}

impl std::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds of the CRITICAL, HIGH and MEDIUM bands, in a domain's unit.
/// Anything below `medium` is LOW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    /// CRITICAL lower bound
    pub critical: f64,
    /// HIGH lower bound
    pub high: f64,
    /// MEDIUM lower bound
    pub medium: f64,
}

impl ThresholdTable {
    /// Runbook defaults for field evaluators, in nanoseconds.
    pub const FIELD_EVALUATOR: ThresholdTable = ThresholdTable {
        critical: 500_000.0,
        high: 200_000.0,
        medium: 50_000.0,
    };

    /// Runbook defaults for correlation rules, in milliseconds.
    pub const CORRELATION_RULE: ThresholdTable = ThresholdTable {
        critical: 100.0,
        high: 50.0,
        medium: 20.0,
    };

    /// Default table for a domain.
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::FieldEvaluator => Self::FIELD_EVALUATOR,
            Domain::CorrelationRule => Self::CORRELATION_RULE,
        }
    }

    /// Lower bound of `band`; LOW has none.
    pub fn lower_bound(&self, band: SeverityBand) -> Option<f64> {
        match band {
            SeverityBand::Critical => Some(self.critical),
            SeverityBand::High => Some(self.high),
            SeverityBand::Medium => Some(self.medium),
            SeverityBand::Low => None,
        }
    }

    /// Check the table is usable: finite, non-negative, strictly descending.
    pub fn check(&self) -> Result<(), String> {
        for (name, value) in [("critical", self.critical), ("high", self.high), ("medium", self.medium)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} threshold must be a non-negative number, got {}", name, value));
            }
        }
        if !(self.critical > self.high && self.high > self.medium) {
            return Err(format!(
                "thresholds must be strictly descending (critical {} > high {} > medium {})",
                self.critical, self.high, self.medium
            ));
        }
        Ok(())
    }
}
