//! Severity classification.

use costlens_core::{SeverityBand, ThresholdTable};

/// Map a cost to its severity band.
///
/// Bands are upward-inclusive: a cost equal to a lower bound belongs to
/// that band. Every input maps to a band; NaN and negative costs are LOW.
pub fn classify(cost: f64, table: &ThresholdTable) -> SeverityBand {
    if cost >= table.critical {
        SeverityBand::Critical
    } else if cost >= table.high {
        SeverityBand::High
    } else if cost >= table.medium {
        SeverityBand::Medium
    } else {
        SeverityBand::Low
    }
}
