//! Custom property (field evaluator) exports.

use costlens_core::{CostStats, FieldEvaluatorStats, Identity, MetricRecord};

use crate::tabular::{mbean_attribute, Table};

/// Parse a `.tabular` field evaluator export. Times are already in ns.
///
/// Missing columns read as empty or zero.
pub fn parse_field_evaluators(text: &str, source_label: &str) -> Vec<MetricRecord> {
    let table = Table::parse(text);
    if table.is_empty() {
        return Vec::new();
    }
    table.warn_missing(&["MBean", "AverageNanoSeconds"], source_label);

    table
        .rows()
        .map(|row| {
            let mbean = row.get_str("MBean");
            let name = mbean_attribute(mbean, "name")
                .filter(|name| !name.is_empty())
                .unwrap_or(mbean);

            MetricRecord::field_evaluator(
                Identity {
                    name: name.to_string(),
                    id: None,
                    group: None,
                    mbean: mbean.to_string(),
                },
                CostStats {
                    average: row.get_f64("AverageNanoSeconds"),
                    max: row.get_f64("LongestMatchNanoSeconds"),
                    min: row.get_f64("ShortestMatchNanoSeconds"),
                },
                FieldEvaluatorStats {
                    pattern: row.get_str("Pattern").to_string(),
                    call_count: row.get_u64("TimesCalled"),
                    failure_count: row.get_u64("TimesCancelled"),
                },
                source_label,
            )
        })
        .collect()
}
