//! Plain-text console report.

use costlens_core::{Domain, SeverityBand};
use costlens_diagnostics::{group_thousands, DiagnosticReport};

use crate::output::{format_cost, RenderContext};

const NAME_WIDTH: usize = 48;

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Render an aligned table followed by each record's findings.
pub fn render_text(report: &DiagnosticReport, ctx: &RenderContext) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(&format!(
        "costlens: {} ({})\n",
        report.domain.title(),
        ctx.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Sources: {}\n", ctx.sources.join(", ")));
    out.push_str(&format!(
        "Analyzed {} of {} (threshold {}); showing {}\n",
        group_thousands(summary.total_analyzed as u64),
        group_thousands(summary.total_records_loaded as u64),
        format_cost(report.unit, report.min_cost),
        report.analyses.len()
    ));
    let bands: Vec<String> = SeverityBand::ALL
        .iter()
        .map(|&band| format!("{}={}", band.label(), summary.band_count(band)))
        .collect();
    out.push_str(&bands.join(" "));
    match report.domain {
        Domain::FieldEvaluator => {
            out.push_str(&format!(" cancelled={}\n", summary.with_failures));
        }
        Domain::CorrelationRule => {
            out.push_str(&format!(
                " accumulated={:.1}s\n",
                summary.accumulated_cost_seconds
            ));
        }
    }
    out.push('\n');

    let volume_header = match report.domain {
        Domain::FieldEvaluator => "CALLS",
        Domain::CorrelationRule => "TESTS",
    };
    out.push_str(&format!(
        "{:>4}  {:<width$}  {:<8}  {:>11}  {:>11}  {:>10}  {:<23}\n",
        "#",
        "NAME",
        "SEVERITY",
        "AVG",
        "MAX",
        volume_header,
        "ACTION",
        width = NAME_WIDTH
    ));

    for analysis in &report.analyses {
        let record = &analysis.record;
        let rec = &analysis.recommendation;
        let name = record.pattern().unwrap_or(record.identity.name.as_str());
        out.push_str(&format!(
            "{:>4}  {:<width$}  {:<8}  {:>11}  {:>11}  {:>10}  {:<23}\n",
            analysis.rank,
            clip(name, NAME_WIDTH),
            analysis.severity.label(),
            format_cost(report.unit, record.cost.average),
            format_cost(report.unit, record.cost.max),
            group_thousands(record.volume()),
            format!("{} P{}", rec.action, rec.priority),
            width = NAME_WIDTH
        ));
        for finding in &rec.findings {
            out.push_str(&format!("{:>6}- {}\n", "", finding));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{context, field_report};

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 6), "abc...");
    }

    #[test]
    fn test_text_report() {
        let text = render_text(&field_report(), &context());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("costlens: Expensive Custom Properties ("));
        assert_eq!(lines[1], "Sources: epfp01.tabular");
        assert!(lines[3].contains("cancelled=1"));
        assert!(text.contains("DISABLE P1"));
        assert!(text.contains("      - "));
    }
}
