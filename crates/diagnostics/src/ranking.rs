//! Ranking and filtering.

use serde::{Deserialize, Serialize};

use costlens_core::{MetricRecord, SeverityBand, ThresholdTable};

use crate::classifier::classify;

/// Filter and truncation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// Records cheaper than this, in the domain unit, are dropped unless they
    /// carry a failure signal
    pub min_cost: f64,
    /// How many records are rendered in detail
    pub max_display: usize,
}

/// Counts over the whole ranked set, not just the displayed slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Records that went into ranking
    pub total_records_loaded: usize,
    /// Records that survived filtering
    pub total_analyzed: usize,
    /// CRITICAL records
    pub critical: usize,
    /// HIGH records
    pub high: usize,
    /// MEDIUM records
    pub medium: usize,
    /// LOW records
    pub low: usize,
    /// Records with cancellations
    pub with_failures: usize,
    /// Sum of accumulated test time, in seconds
    pub accumulated_cost_seconds: f64,
}

impl ReportSummary {
    /// Count for one band.
    pub fn band_count(&self, band: SeverityBand) -> usize {
        match band {
            SeverityBand::Critical => self.critical,
            SeverityBand::High => self.high,
            SeverityBand::Medium => self.medium,
            SeverityBand::Low => self.low,
        }
    }

    fn count(&mut self, record: &MetricRecord, band: SeverityBand) {
        self.total_analyzed += 1;
        match band {
            SeverityBand::Critical => self.critical += 1,
            SeverityBand::High => self.high += 1,
            SeverityBand::Medium => self.medium += 1,
            SeverityBand::Low => self.low += 1,
        }
        if record.has_failure() {
            self.with_failures += 1;
        }
        self.accumulated_cost_seconds += record.total_cost_seconds();
    }
}

/// Result of ranking a record collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Every surviving record, most urgent first
    pub records: Vec<MetricRecord>,
    /// Counts over `records`
    pub summary: ReportSummary,
    /// Length of the displayed prefix
    pub display: usize,
}

impl Ranking {
    /// The slice rendered in detail.
    pub fn displayed(&self) -> &[MetricRecord] {
        &self.records[..self.display]
    }
}

/// Filter, order and count `records`.
///
/// Records at or above `min_cost` are kept, as is every record with a
/// failure signal whatever its cost. Failures sort first, then cost
/// descending; ties keep input order.
pub fn rank(
    records: Vec<MetricRecord>,
    thresholds: &ThresholdTable,
    options: &RankingOptions,
) -> Ranking {
    let total_records_loaded = records.len();

    let mut kept: Vec<MetricRecord> = records
        .into_iter()
        .filter(|r| r.has_failure() || r.cost.average >= options.min_cost)
        .collect();

    // stable: equal keys keep input order
    kept.sort_by(|a, b| {
        b.has_failure()
            .cmp(&a.has_failure())
            .then_with(|| b.cost.average.total_cmp(&a.cost.average))
    });

    let mut summary = ReportSummary {
        total_records_loaded,
        ..Default::default()
    };
    for record in &kept {
        summary.count(record, classify(record.cost.average, thresholds));
    }

    let display = kept.len().min(options.max_display);
    Ranking {
        records: kept,
        summary,
        display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_core::{CorrelationRuleStats, CostStats, FieldEvaluatorStats, Identity};

    fn field(name: &str, average: f64, failures: u64) -> MetricRecord {
        MetricRecord::field_evaluator(
            Identity::named(name),
            CostStats { average, max: average, min: average },
            FieldEvaluatorStats {
                pattern: String::new(),
                call_count: 100,
                failure_count: failures,
            },
            "test",
        )
    }

    fn names(records: &[MetricRecord]) -> Vec<&str> {
        records.iter().map(|r| r.identity.name.as_str()).collect()
    }

    fn options(min_cost: f64, max_display: usize) -> RankingOptions {
        RankingOptions { min_cost, max_display }
    }

    #[test]
    fn test_failures_sort_first() {
        let records = vec![field("A", 10.0, 0), field("B", 999.0, 1), field("C", 500.0, 0)];
        let ranking = rank(records, &ThresholdTable::FIELD_EVALUATOR, &options(0.0, 10));
        assert_eq!(names(&ranking.records), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_failures_survive_threshold() {
        let records = vec![
            field("cheap", 10.0, 0),
            field("cheap-failing", 5.0, 3),
            field("expensive", 80_000.0, 0),
        ];
        let ranking = rank(records, &ThresholdTable::FIELD_EVALUATOR, &options(20_000.0, 10));
        assert_eq!(names(&ranking.records), vec!["cheap-failing", "expensive"]);
        assert_eq!(ranking.summary.total_records_loaded, 3);
        assert_eq!(ranking.summary.total_analyzed, 2);
        assert_eq!(ranking.summary.with_failures, 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let records = vec![field("edge", 20_000.0, 0), field("below", 19_999.0, 0)];
        let ranking = rank(records, &ThresholdTable::FIELD_EVALUATOR, &options(20_000.0, 10));
        assert_eq!(names(&ranking.records), vec!["edge"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            field("first", 100.0, 0),
            field("second", 100.0, 0),
            field("third", 100.0, 0),
            field("f1", 100.0, 2),
            field("f2", 100.0, 1),
        ];
        let ranking = rank(records, &ThresholdTable::FIELD_EVALUATOR, &options(0.0, 10));
        assert_eq!(names(&ranking.records), vec!["f1", "f2", "first", "second", "third"]);
    }

    #[test]
    fn test_counts_cover_full_set() {
        let records = vec![
            field("c", 600_000.0, 0),
            field("h", 300_000.0, 0),
            field("m", 60_000.0, 0),
            field("l1", 1_000.0, 0),
            field("l2", 900.0, 1),
        ];
        let ranking = rank(records, &ThresholdTable::FIELD_EVALUATOR, &options(0.0, 2));

        assert_eq!(ranking.display, 2);
        assert_eq!(names(ranking.displayed()), vec!["l2", "c"]);

        let summary = &ranking.summary;
        assert_eq!(summary.total_analyzed, 5);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.low, 2);
        assert_eq!(summary.band_count(SeverityBand::Low), 2);
        assert_eq!(summary.with_failures, 1);
    }

    #[test]
    fn test_empty_input() {
        let ranking = rank(Vec::new(), &ThresholdTable::CORRELATION_RULE, &options(10.0, 100));
        assert!(ranking.records.is_empty());
        assert!(ranking.displayed().is_empty());
        assert_eq!(ranking.summary, ReportSummary::default());
    }

    #[test]
    fn test_accumulated_cost_from_rules() {
        let rule = |name: &str, average: f64, total: f64| {
            MetricRecord::correlation_rule(
                Identity::named(name),
                CostStats { average, max: average, min: 0.0 },
                CorrelationRuleStats {
                    test_count: 10,
                    total_test_seconds: total,
                    ..Default::default()
                },
                "test",
            )
        };
        let records = vec![rule("a", 50.0, 1.5), rule("b", 5.0, 100.0), rule("c", 20.0, 2.5)];
        let ranking = rank(records, &ThresholdTable::CORRELATION_RULE, &options(10.0, 100));
        assert_eq!(names(&ranking.records), vec!["a", "c"]);
        assert_eq!(ranking.summary.accumulated_cost_seconds, 4.0);
    }
}
