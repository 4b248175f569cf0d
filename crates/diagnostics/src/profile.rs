//! Per-domain capability descriptors.

use costlens_core::{Domain, Issue, ThresholdTable};

use crate::pattern::analyze_pattern;
use crate::rules::{self, ActionRule, FindingFn, FindingRule};

/// Everything the engine needs to know about one domain.
///
/// Adding a domain means adding a profile; the engine itself is shared.
#[derive(Debug, Clone)]
pub struct DomainProfile {
    /// Which domain this describes
    pub domain: Domain,
    /// Severity bands, in the domain's unit
    pub thresholds: ThresholdTable,
    /// First-match-wins primary rows
    pub action_rules: Vec<ActionRule>,
    /// Supplementary rows, all evaluated
    pub finding_rules: Vec<FindingRule>,
    /// Applied last while the action is still MONITOR
    pub escalation: ActionRule,
    /// Finding used when nothing else had anything to say
    pub default_finding: FindingFn,
    /// Extraction-pattern analyzer, for domains that carry patterns
    pub pattern_hook: Option<fn(&str) -> Vec<Issue>>,
}

impl DomainProfile {
    /// Field evaluator profile.
    pub fn field_evaluator(thresholds: ThresholdTable) -> Self {
        Self {
            domain: Domain::FieldEvaluator,
            thresholds,
            action_rules: rules::field_evaluator_actions(),
            finding_rules: rules::field_evaluator_findings(),
            escalation: rules::MEDIUM_ESCALATION,
            default_finding: rules::field_evaluator_default_finding,
            pattern_hook: Some(analyze_pattern),
        }
    }

    /// Correlation rule profile.
    pub fn correlation_rule(thresholds: ThresholdTable) -> Self {
        Self {
            domain: Domain::CorrelationRule,
            thresholds,
            action_rules: rules::correlation_rule_actions(),
            finding_rules: rules::correlation_rule_findings(),
            escalation: rules::MEDIUM_ESCALATION,
            default_finding: rules::correlation_rule_default_finding,
            pattern_hook: None,
        }
    }

    /// Profile for `domain` with the given thresholds.
    pub fn for_domain(domain: Domain, thresholds: ThresholdTable) -> Self {
        match domain {
            Domain::FieldEvaluator => Self::field_evaluator(thresholds),
            Domain::CorrelationRule => Self::correlation_rule(thresholds),
        }
    }

    /// Run the pattern hook, if the profile has one.
    pub fn pattern_issues(&self, pattern: Option<&str>) -> Vec<Issue> {
        match (self.pattern_hook, pattern) {
            (Some(hook), Some(pattern)) => hook(pattern),
            _ => Vec::new(),
        }
    }
}
