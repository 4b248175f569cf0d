//! Diagnostic engine.

use serde::Serialize;

use costlens_core::{
    Action, AnalyzerConfig, CostUnit, Domain, EngineSettings, Issue, MetricRecord,
    Recommendation, SeverityBand, ThresholdTable, DEFAULT_PRIORITY,
};

use crate::classifier::classify;
use crate::profile::DomainProfile;
use crate::ranking::{rank, RankingOptions, ReportSummary};
use crate::rules::RuleContext;

/// Everything known about one ranked record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// 1-based position in the ranking
    pub rank: usize,
    /// The record itself
    pub record: MetricRecord,
    /// Severity band of its average cost
    pub severity: SeverityBand,
    /// Pattern analyzer output
    pub issues: Vec<Issue>,
    /// What to do about it
    pub recommendation: Recommendation,
}

/// Output of one engine run, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    /// Domain analyzed
    pub domain: Domain,
    /// Unit of every cost in the report
    pub unit: CostUnit,
    /// Severity bands that were applied
    pub thresholds: ThresholdTable,
    /// Cost filter that was applied, in `unit`
    pub min_cost: f64,
    /// Requested display count
    pub top: usize,
    /// Counts over the whole ranked set
    pub summary: ReportSummary,
    /// Displayed records, most urgent first
    pub analyses: Vec<Analysis>,
}

impl DiagnosticReport {
    /// The first `n` analyses.
    pub fn leading(&self, n: usize) -> &[Analysis] {
        &self.analyses[..self.analyses.len().min(n)]
    }
}

/// One engine for every domain, parameterized by [`DomainProfile`].
#[derive(Debug, Clone)]
pub struct DiagnosticEngine {
    field_evaluator: DomainProfile,
    correlation_rule: DomainProfile,
    settings: EngineSettings,
}

impl DiagnosticEngine {
    /// Build an engine from run configuration.
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            field_evaluator: DomainProfile::field_evaluator(config.field_evaluator.thresholds),
            correlation_rule: DomainProfile::correlation_rule(config.correlation_rule.thresholds),
            settings: config.engine.clone(),
        }
    }

    /// Profile used for `domain`.
    pub fn profile(&self, domain: Domain) -> &DomainProfile {
        match domain {
            Domain::FieldEvaluator => &self.field_evaluator,
            Domain::CorrelationRule => &self.correlation_rule,
        }
    }

    /// Severity band of a record.
    pub fn classify(&self, record: &MetricRecord) -> SeverityBand {
        classify(record.cost.average, &self.profile(record.domain()).thresholds)
    }

    /// Pattern issues of a record; empty for domains without patterns.
    pub fn issues(&self, record: &MetricRecord) -> Vec<Issue> {
        self.profile(record.domain()).pattern_issues(record.pattern())
    }

    /// Produce the recommendation for one record.
    pub fn recommend(&self, record: &MetricRecord, issues: &[Issue]) -> Recommendation {
        let profile = self.profile(record.domain());
        let ctx = RuleContext {
            record,
            band: classify(record.cost.average, &profile.thresholds),
            thresholds: &profile.thresholds,
            settings: &self.settings,
        };

        let mut action = Action::Monitor;
        let mut priority = DEFAULT_PRIORITY;
        let mut findings = Vec::new();

        if let Some(rule) = profile.action_rules.iter().find(|rule| (rule.applies)(&ctx)) {
            tracing::trace!("{}: action rule {} matched", record.identity.name, rule.name);
            action = rule.action;
            priority = rule.priority;
            if let Some(finding) = rule.finding {
                findings.push(finding(&ctx));
            }
        }

        for rule in profile.finding_rules.iter().filter(|rule| (rule.applies)(&ctx)) {
            tracing::trace!("{}: finding rule {} matched", record.identity.name, rule.name);
            findings.push((rule.finding)(&ctx));
            if let Some((upgrade, upgrade_priority)) = rule.upgrade {
                if action == Action::Monitor {
                    action = upgrade;
                    priority = upgrade_priority;
                }
            }
        }

        findings.extend(issues.iter().map(Issue::as_finding));

        if findings.is_empty() {
            findings.push((profile.default_finding)(&ctx));
        }

        let escalation = &profile.escalation;
        if action == Action::Monitor && (escalation.applies)(&ctx) {
            action = escalation.action;
            priority = escalation.priority;
            if let Some(finding) = escalation.finding {
                findings.push(finding(&ctx));
            }
        }

        Recommendation {
            action,
            priority,
            findings,
        }
    }

    /// Classify, scan and recommend one record.
    pub fn analyze(&self, rank: usize, record: MetricRecord) -> Analysis {
        let severity = self.classify(&record);
        let issues = self.issues(&record);
        let recommendation = self.recommend(&record, &issues);
        Analysis {
            rank,
            record,
            severity,
            issues,
            recommendation,
        }
    }

    /// Rank `records` and analyze the displayed slice.
    ///
    /// Records of another domain are dropped.
    pub fn run(
        &self,
        domain: Domain,
        records: Vec<MetricRecord>,
        options: &RankingOptions,
    ) -> DiagnosticReport {
        let loaded = records.len();
        let records: Vec<MetricRecord> = records
            .into_iter()
            .filter(|r| r.domain() == domain)
            .collect();
        if records.len() < loaded {
            tracing::debug!(
                "Ignoring {} records that are not {} records",
                loaded - records.len(),
                domain
            );
        }

        let profile = self.profile(domain);
        let ranking = rank(records, &profile.thresholds, options);
        tracing::debug!(
            "{} of {} {} records above {} {}",
            ranking.summary.total_analyzed,
            ranking.summary.total_records_loaded,
            domain,
            options.min_cost,
            domain.unit().symbol()
        );

        let display = ranking.display;
        let summary = ranking.summary;
        let analyses = ranking
            .records
            .into_iter()
            .take(display)
            .enumerate()
            .map(|(i, record)| self.analyze(i + 1, record))
            .collect();

        DiagnosticReport {
            domain,
            unit: domain.unit(),
            thresholds: profile.thresholds,
            min_cost: options.min_cost,
            top: options.max_display,
            summary,
            analyses,
        }
    }
}
