//! CustomRule (correlation rule) exports.

use costlens_core::{CorrelationRuleStats, CostStats, Identity, MetricRecord};

use crate::tabular::{mbean_attribute, Table};

const MS_PER_SECOND: f64 = 1000.0;

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a CustomRule TSV export.
///
/// Test times are exported in seconds and converted to milliseconds here.
/// Rules that were never tested and have no average are dropped. Missing
/// columns read as empty or zero.
pub fn parse_correlation_rules(text: &str, source_label: &str) -> Vec<MetricRecord> {
    let table = Table::parse(text);
    if table.is_empty() {
        return Vec::new();
    }
    table.warn_missing(&["MBean", "AllTimeAverageTestTime"], source_label);

    let mut dropped = 0usize;
    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        let average = row.get_f64("AllTimeAverageTestTime") * MS_PER_SECOND;
        let test_count = row.get_u64("TotalTestCount");
        if test_count == 0 && average == 0.0 {
            dropped += 1;
            continue;
        }

        let mbean = row.get_str("MBean");
        let name = match row.get_str("Name") {
            "" => mbean,
            name => name,
        };

        records.push(MetricRecord::correlation_rule(
            Identity {
                name: name.to_string(),
                id: non_empty(row.get_str("Id")),
                group: mbean_attribute(mbean, "folder").and_then(non_empty),
                mbean: mbean.to_string(),
            },
            CostStats {
                average,
                max: row.get_f64("AllTimeMaximumTestTime") * MS_PER_SECOND,
                min: 0.0,
            },
            CorrelationRuleStats {
                test_count,
                fired_count: row.get_u64("FiredCount"),
                capacity_eps: row.get_f64("CapacityEps"),
                total_test_seconds: row.get_f64("TotalTestTime"),
                response_count: row.get_u64("TotalResponseCount"),
            },
            source_label,
        ));
    }

    if dropped > 0 {
        tracing::debug!("{}: skipped {} rules that were never tested", source_label, dropped);
    }
    records
}
