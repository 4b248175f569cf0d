//! Recommendation rule tables.
//!
//! Primary rules are evaluated in order and the first match sets the
//! action and priority. Finding rules are all evaluated and append text;
//! one of them may upgrade an action that is still MONITOR.

use costlens_core::{Action, EngineSettings, MetricRecord, SeverityBand, ThresholdTable};

use crate::format::group_thousands;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Record under evaluation
    pub record: &'a MetricRecord,
    /// Its severity band
    pub band: SeverityBand,
    /// The domain's threshold table
    pub thresholds: &'a ThresholdTable,
    /// Engine settings
    pub settings: &'a EngineSettings,
}

impl RuleContext<'_> {
    /// Average cost in the domain unit.
    pub fn cost(&self) -> f64 {
        self.record.cost.average
    }

    /// Average cost in milliseconds.
    pub fn cost_ms(&self) -> f64 {
        self.record.domain().unit().to_millis(self.cost())
    }

    /// Peak cost in milliseconds.
    pub fn max_cost_ms(&self) -> f64 {
        self.record.domain().unit().to_millis(self.record.cost.max)
    }

    /// Calls or tests.
    pub fn volume(&self) -> u64 {
        self.record.volume()
    }

    /// Whether the band is CRITICAL.
    pub fn is_critical(&self) -> bool {
        self.band == SeverityBand::Critical
    }

    /// Whether average cost reaches the MEDIUM lower bound.
    pub fn at_least_medium(&self) -> bool {
        self.cost() >= self.thresholds.medium
    }

    /// Whether average cost reaches the HIGH lower bound.
    pub fn at_least_high(&self) -> bool {
        self.cost() >= self.thresholds.high
    }
}

/// Predicate over a rule context.
pub type Predicate = fn(&RuleContext<'_>) -> bool;

/// Produces finding text.
pub type FindingFn = fn(&RuleContext<'_>) -> String;

/// An ordered, first-match-wins row.
#[derive(Clone, Copy)]
pub struct ActionRule {
    /// Name used in logs
    pub name: &'static str,
    /// When the row applies
    pub applies: Predicate,
    /// Action chosen
    pub action: Action,
    /// Priority chosen
    pub priority: u8,
    /// Finding explaining the choice
    pub finding: Option<FindingFn>,
}

impl std::fmt::Debug for ActionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRule")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("priority", &self.priority)
            .finish()
    }
}

/// A supplementary row; every matching row appends its finding.
#[derive(Clone, Copy)]
pub struct FindingRule {
    /// Name used in logs
    pub name: &'static str,
    /// When the row applies
    pub applies: Predicate,
    /// Finding text
    pub finding: FindingFn,
    /// Action and priority to take if the action is still MONITOR
    pub upgrade: Option<(Action, u8)>,
}

impl std::fmt::Debug for FindingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindingRule")
            .field("name", &self.name)
            .field("upgrade", &self.upgrade)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Applied last, only while the action is still MONITOR.
pub const MEDIUM_ESCALATION: ActionRule = ActionRule {
    name: "medium_cost_review",
    applies: |ctx| ctx.at_least_medium(),
    action: Action::Review,
    priority: 3,
    finding: None,
};

const ACCEPTABLE: &str =
    "Within acceptable range. Keep monitoring if the system shows performance degradation.";

/// Default finding for field evaluators.
pub fn field_evaluator_default_finding(_ctx: &RuleContext<'_>) -> String {
    ACCEPTABLE.to_string()
}

/// Default finding for correlation rules; medium-cost rules get ordering advice.
pub fn correlation_rule_default_finding(ctx: &RuleContext<'_>) -> String {
    if ctx.at_least_medium() {
        "Elevated evaluation time. Make sure the most selective conditions come first in the \
         evaluation chain."
            .to_string()
    } else {
        ACCEPTABLE.to_string()
    }
}

/// `max / max(average, floor)` when that ratio exceeds `limit` and the
/// peak is above the HIGH bound.
///
/// Near a zero average the floor keeps the ratio finite but the value
/// says little.
fn instability(ctx: &RuleContext<'_>, limit: f64, floor: f64) -> Option<f64> {
    let cost = ctx.record.cost;
    let ratio = cost.max / cost.average.max(floor);
    (ratio > limit && cost.max > ctx.thresholds.high).then_some(ratio)
}

// ---------------------------------------------------------------------------
// Field evaluators
// ---------------------------------------------------------------------------

const FIELD_INSTABILITY_LIMIT: f64 = 20.0;
const FIELD_RATIO_FLOOR_NS: f64 = 1.0;

/// Primary rows for field evaluators.
pub fn field_evaluator_actions() -> Vec<ActionRule> {
    vec![
        ActionRule {
            name: "cancellations",
            applies: |ctx| ctx.record.has_failure(),
            action: Action::Disable,
            priority: 1,
            finding: Some(cancellation_finding),
        },
        ActionRule {
            name: "critical_high_volume",
            applies: |ctx| ctx.is_critical() && ctx.volume() > 1000,
            action: Action::Rewrite,
            priority: 1,
            finding: Some(|ctx| {
                let cpu_per_sec = ctx.cost() * ctx.settings.reference_eps / 1e9;
                format!(
                    "{:.3}ms average over {} calls costs about {:.2}s of CPU per second at {} EPS. \
                     Rewrite the pattern with cheaper constructs.",
                    ctx.cost_ms(),
                    group_thousands(ctx.volume()),
                    cpu_per_sec,
                    ctx.settings.reference_eps
                )
            }),
        },
        ActionRule {
            name: "critical_low_volume",
            applies: |ctx| ctx.is_critical() && ctx.volume() < 100,
            action: Action::Review,
            priority: 2,
            finding: Some(|ctx| {
                format!(
                    "High cost per evaluation ({:.3}ms) but only {} calls. The impact grows with \
                     the volume of matching events; narrow the log sources or categories it \
                     applies to.",
                    ctx.cost_ms(),
                    ctx.volume()
                )
            }),
        },
        ActionRule {
            name: "high_cost",
            applies: |ctx| ctx.at_least_high(),
            action: Action::Optimize,
            priority: 2,
            finding: Some(|ctx| {
                format!(
                    "Elevated evaluation time ({:.3}ms average). Review the pattern and apply the \
                     optimisations listed below.",
                    ctx.cost_ms()
                )
            }),
        },
    ]
}

fn cancellation_finding(ctx: &RuleContext<'_>) -> String {
    let failures = ctx.record.failure_count();
    let pct = failures as f64 / ctx.volume().max(1) as f64 * 100.0;
    format!(
        "{} cancellations ({:.1}% of evaluations). The evaluator is timing out, so affected \
         events bypass correlation and classification and go straight to storage. Nothing \
         crashes and no alert is raised: it is a silent data-quality failure. Disable it until \
         the pattern is rewritten.",
        group_thousands(failures),
        pct
    )
}

/// Supplementary rows for field evaluators.
pub fn field_evaluator_findings() -> Vec<FindingRule> {
    vec![FindingRule {
        name: "peak_instability",
        applies: |ctx| {
            instability(ctx, FIELD_INSTABILITY_LIMIT, FIELD_RATIO_FLOOR_NS).is_some()
        },
        finding: |ctx| {
            let ratio =
                instability(ctx, FIELD_INSTABILITY_LIMIT, FIELD_RATIO_FLOOR_NS).unwrap_or_default();
            format!(
                "Peak of {:.3}ms vs {:.3}ms average (ratio {:.0}x). Unstable on certain payloads, \
                 most likely catastrophic backtracking triggered by specific events.",
                ctx.max_cost_ms(),
                ctx.cost_ms(),
                ratio
            )
        },
        upgrade: None,
    }]
}

// ---------------------------------------------------------------------------
// Correlation rules
// ---------------------------------------------------------------------------

const RULE_INSTABILITY_LIMIT: f64 = 10.0;
const RULE_RATIO_FLOOR_MS: f64 = 0.001;

fn fired(ctx: &RuleContext<'_>) -> u64 {
    ctx.record.fired_count().unwrap_or_default()
}

/// Primary rows for correlation rules.
pub fn correlation_rule_actions() -> Vec<ActionRule> {
    vec![
        ActionRule {
            name: "never_fired",
            applies: |ctx| ctx.is_critical() && fired(ctx) == 0 && ctx.volume() > 500,
            action: Action::Disable,
            priority: 1,
            finding: Some(|ctx| {
                format!(
                    "Averages {:.1}ms per event but has never fired (0 firings in {} tests). \
                     Pure CPU cost with no operational value.",
                    ctx.cost_ms(),
                    group_thousands(ctx.volume())
                )
            }),
        },
        ActionRule {
            name: "critical_high_volume",
            applies: |ctx| ctx.is_critical() && ctx.volume() > 1000,
            action: Action::Rewrite,
            priority: 1,
            finding: Some(|ctx| {
                format!(
                    "Average of {:.1}ms over {} tests: {:.1}s of accumulated CPU in this rule \
                     alone. Put cheap conditions (IP, port, category) ahead of expensive ones \
                     (functions, accumulations, reference lookups).",
                    ctx.cost_ms(),
                    group_thousands(ctx.volume()),
                    ctx.cost_ms() * ctx.volume() as f64 / 1000.0
                )
            }),
        },
        ActionRule {
            name: "building_block",
            applies: |ctx| {
                ctx.at_least_medium()
                    && ctx.record.identity.mentions(&ctx.settings.building_block_marker)
            },
            action: Action::OptimizeBuildingBlock,
            priority: 2,
            finding: Some(|_| {
                "Building block referenced by several rules: every rule that uses it pays this \
                 cost, so optimising it has a multiplied effect. Simplify its conditions."
                    .to_string()
            }),
        },
        ActionRule {
            name: "high_cost",
            applies: |ctx| ctx.at_least_high(),
            action: Action::Optimize,
            priority: 2,
            finding: Some(|ctx| {
                format!(
                    "Elevated test time ({:.1}ms average). Review the rule's conditions and move \
                     the most selective ones first.",
                    ctx.cost_ms()
                )
            }),
        },
    ]
}

/// Supplementary rows for correlation rules.
pub fn correlation_rule_findings() -> Vec<FindingRule> {
    vec![
        FindingRule {
            name: "peak_instability",
            applies: |ctx| instability(ctx, RULE_INSTABILITY_LIMIT, RULE_RATIO_FLOOR_MS).is_some(),
            finding: |ctx| {
                let ratio =
                    instability(ctx, RULE_INSTABILITY_LIMIT, RULE_RATIO_FLOOR_MS).unwrap_or_default();
                format!(
                    "All-time peak of {:.0}ms vs {:.1}ms average (ratio {:.0}x). Unstable on \
                     certain events; look for regex conditions or lookups that trigger \
                     sporadically.",
                    ctx.max_cost_ms(),
                    ctx.cost_ms(),
                    ratio
                )
            },
            upgrade: None,
        },
        FindingRule {
            name: "capacity_pressure",
            applies: |ctx| {
                let eps = ctx.record.capacity_eps();
                eps > 0.0 && eps < ctx.settings.capacity_floor_eps
            },
            finding: |ctx| {
                format!(
                    "CapacityEPS={}: this rule caps the processor below {} EPS. Optimise it to \
                     recover headroom.",
                    group_thousands(ctx.record.capacity_eps().round() as u64),
                    group_thousands(ctx.settings.capacity_floor_eps.round() as u64)
                )
            },
            upgrade: None,
        },
        FindingRule {
            name: "high_frequency",
            applies: |ctx| ctx.volume() > 2000 && ctx.at_least_medium(),
            finding: |ctx| {
                format!(
                    "High test frequency ({} tests). Add selective filtering conditions at the \
                     start of the rule so fewer events reach the expensive ones.",
                    group_thousands(ctx.volume())
                )
            },
            upgrade: Some((Action::Optimize, 2)),
        },
        FindingRule {
            name: "alert_volume",
            applies: |ctx| fired(ctx) > 1000,
            finding: |ctx| {
                format!(
                    "Fired {} times. If the alert volume is excessive, add suppression \
                     conditions or tune its thresholds.",
                    group_thousands(fired(ctx))
                )
            },
            upgrade: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_core::{CorrelationRuleStats, CostStats, FieldEvaluatorStats, Identity};

    fn field(average: f64, max: f64) -> MetricRecord {
        MetricRecord::field_evaluator(
            Identity::named("p"),
            CostStats { average, max, min: 0.0 },
            FieldEvaluatorStats::default(),
            "t",
        )
    }

    fn context<'a>(
        record: &'a MetricRecord,
        thresholds: &'a ThresholdTable,
        settings: &'a EngineSettings,
    ) -> RuleContext<'a> {
        RuleContext {
            record,
            band: crate::classifier::classify(record.cost.average, thresholds),
            thresholds,
            settings,
        }
    }

    #[test]
    fn test_instability_requires_peak_above_high() {
        let settings = EngineSettings::default();
        let table = ThresholdTable::FIELD_EVALUATOR;

        // ratio 30x but the peak is below HIGH
        let quiet = field(1_000.0, 30_000.0);
        assert!(instability(&context(&quiet, &table, &settings), 20.0, 1.0).is_none());

        let spiky = field(10_000.0, 300_000.0);
        let ratio = instability(&context(&spiky, &table, &settings), 20.0, 1.0);
        assert_eq!(ratio, Some(30.0));
    }

    #[test]
    fn test_instability_zero_average_uses_floor() {
        let settings = EngineSettings::default();
        let table = ThresholdTable::FIELD_EVALUATOR;
        let record = field(0.0, 250_000.0);
        let ratio = instability(&context(&record, &table, &settings), 20.0, 1.0);
        assert_eq!(ratio, Some(250_000.0));
    }

    #[test]
    fn test_rule_tables_are_ordered() {
        let names: Vec<_> = correlation_rule_actions().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["never_fired", "critical_high_volume", "building_block", "high_cost"]);

        let names: Vec<_> = field_evaluator_actions().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["cancellations", "critical_high_volume", "critical_low_volume", "high_cost"]
        );
    }

    #[test]
    fn test_cancellation_percentage() {
        let settings = EngineSettings::default();
        let table = ThresholdTable::FIELD_EVALUATOR;
        let record = MetricRecord::field_evaluator(
            Identity::named("p"),
            CostStats::default(),
            FieldEvaluatorStats {
                pattern: String::new(),
                call_count: 200,
                failure_count: 5,
            },
            "t",
        );
        let text = cancellation_finding(&context(&record, &table, &settings));
        assert!(text.starts_with("5 cancellations (2.5% of evaluations)"));
    }

    #[test]
    fn test_capacity_finding_formats_numbers() {
        let settings = EngineSettings::default();
        let table = ThresholdTable::CORRELATION_RULE;
        let record = MetricRecord::correlation_rule(
            Identity::named("r"),
            CostStats::default(),
            CorrelationRuleStats {
                capacity_eps: 123_456.4,
                ..Default::default()
            },
            "t",
        );
        let ctx = context(&record, &table, &settings);
        let rule = correlation_rule_findings()
            .into_iter()
            .find(|r| r.name == "capacity_pressure")
            .unwrap();
        assert!((rule.applies)(&ctx));
        assert!((rule.finding)(&ctx).starts_with("CapacityEPS=123,456"));
    }
}
