//! Self-contained HTML report.

use costlens_core::{Action, Domain, SeverityBand};
use costlens_diagnostics::{group_thousands, Analysis, DiagnosticReport};

use crate::output::{format_cost, rule_edit_link, RenderContext};

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f9fafb; color: #111827; }
.header { background: linear-gradient(135deg, #312e81, #7c3aed); color: white; padding: 24px 32px; }
.header h1 { margin: 0 0 6px 0; font-size: 22px; }
.header .meta { font-size: 12px; opacity: 0.85; }
.content { padding: 0 32px 32px 32px; }
.summary-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(170px, 1fr)); gap: 16px; margin: 24px 0; }
.card { background: white; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
.card .value { font-size: 32px; font-weight: 700; }
.card .label { font-size: 12px; color: #6b7280; margin-top: 4px; }
.alert { background: #fef2f2; border: 1px solid #fecaca; border-radius: 6px; padding: 10px; margin-bottom: 12px; color: #dc2626; }
.top3 { font-family: monospace; font-size: 11px; background: #f3f4f6; padding: 10px; border-radius: 4px; line-height: 1.8; word-break: break-all; }
table { width: 100%; border-collapse: collapse; background: white; font-size: 12px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
th { background: #312e81; color: white; text-align: left; padding: 8px; }
td { padding: 8px; border-bottom: 1px solid #e5e7eb; vertical-align: top; }
td.mono { font-family: monospace; word-break: break-all; }
.badge { display: inline-block; padding: 2px 8px; border-radius: 10px; font-size: 11px; font-weight: 700; }
ul.findings { margin: 0; padding-left: 16px; }
.guide { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; font-size: 13px; }
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn severity_color(band: SeverityBand) -> &'static str {
    match band {
        SeverityBand::Critical => "#dc2626",
        SeverityBand::High => "#ea580c",
        SeverityBand::Medium => "#ca8a04",
        SeverityBand::Low => "#16a34a",
    }
}

fn action_color(action: Action) -> &'static str {
    match action {
        Action::Disable => "#dc2626",
        Action::Rewrite => "#9333ea",
        Action::Optimize => "#d97706",
        Action::OptimizeBuildingBlock => "#db2777",
        Action::Review => "#2563eb",
        Action::Monitor => "#16a34a",
    }
}

fn badge(label: &str, color: &str) -> String {
    format!(
        r#"<span class="badge" style="background:{color}15;color:{color};border:1px solid {color}40;">{label}</span>"#,
        color = color,
        label = escape(label)
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Main label of an analysis: the pattern for field evaluators, the name otherwise.
fn headline(analysis: &Analysis) -> &str {
    analysis
        .record
        .pattern()
        .unwrap_or(analysis.record.identity.name.as_str())
}

fn band_card(report: &DiagnosticReport, band: SeverityBand) -> String {
    let floor = report
        .thresholds
        .lower_bound(band)
        .map(|bound| format!(" (&ge;{})", format_cost(report.unit, bound)))
        .unwrap_or_default();
    format!(
        r#"<div class="card"><div class="value" style="color:{};">{}</div><div class="label">{}{}</div></div>"#,
        severity_color(band),
        group_thousands(report.summary.band_count(band) as u64),
        band.label(),
        floor
    )
}

fn summary_cards(report: &DiagnosticReport) -> String {
    let mut html = String::from(r#"<div class="summary-grid">"#);
    for band in [SeverityBand::Critical, SeverityBand::High, SeverityBand::Medium] {
        html.push_str(&band_card(report, band));
    }
    match report.domain {
        Domain::FieldEvaluator => html.push_str(&format!(
            r#"<div class="card"><div class="value" style="color:#dc2626;">{}</div><div class="label">With cancellations</div></div>"#,
            group_thousands(report.summary.with_failures as u64)
        )),
        Domain::CorrelationRule => html.push_str(&format!(
            r#"<div class="card"><div class="value" style="color:#374151;">{:.1}s</div><div class="label">Accumulated test time</div></div>"#,
            report.summary.accumulated_cost_seconds
        )),
    }
    html.push_str(&format!(
        r#"<div class="card"><div class="value" style="color:#374151;">{}</div><div class="label">Analyzed {}</div></div>"#,
        group_thousands(report.summary.total_analyzed as u64),
        report.domain.noun()
    ));
    html.push_str("</div>");
    html
}

fn executive_summary(report: &DiagnosticReport) -> String {
    let summary = &report.summary;
    let mut html = String::from(
        r#"<div class="card" style="margin-bottom:24px;border-left:4px solid #7c3aed;"><h3 style="margin-top:0;">Executive summary</h3>"#,
    );
    if summary.with_failures > 0 {
        html.push_str(&format!(
            r#"<div class="alert"><strong>Critical alert:</strong> {} field evaluator(s) report cancellations. Affected events skip correlation and go straight to storage. Disable them immediately.</div>"#,
            group_thousands(summary.with_failures as u64)
        ));
    }
    html.push_str(&format!(
        "<p>{} of {} {} analyzed; <strong style=\"color:#dc2626;\">{} critical</strong>.</p>",
        group_thousands(summary.total_analyzed as u64),
        group_thousands(summary.total_records_loaded as u64),
        report.domain.noun(),
        group_thousands(summary.critical as u64)
    ));

    let leading = report.leading(3);
    if !leading.is_empty() {
        html.push_str(r#"<strong>Top 3 most expensive:</strong><div class="top3">"#);
        let lines: Vec<String> = leading
            .iter()
            .map(|a| {
                format!(
                    r#"<b>#{}</b> {} <span style="color:#dc2626">({} avg)</span>"#,
                    a.rank,
                    escape(&truncate(headline(a), 70)),
                    format_cost(report.unit, a.record.cost.average)
                )
            })
            .collect();
        html.push_str(&lines.join("<br>"));
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn table_header(domain: Domain) -> &'static str {
    match domain {
        Domain::FieldEvaluator => {
            "<tr><th>#</th><th>Pattern</th><th>Severity</th><th>Avg</th><th>Max / Min</th>\
             <th>Calls</th><th>Cancelled</th><th>Source</th><th>Action</th><th>Findings</th></tr>"
        }
        Domain::CorrelationRule => {
            "<tr><th>#</th><th>Rule</th><th>Severity</th><th>Avg</th><th>All-time max</th>\
             <th>Tests</th><th>Fired</th><th>Capacity EPS</th><th>Action</th><th>Findings</th></tr>"
        }
    }
}

fn row(report: &DiagnosticReport, analysis: &Analysis) -> String {
    let record = &analysis.record;
    let rec = &analysis.recommendation;
    let unit = report.unit;

    let findings: String = rec
        .findings
        .iter()
        .map(|f| format!("<li>{}</li>", escape(f)))
        .collect();
    let action = format!(
        "{}<br><small>P{}</small>",
        badge(rec.action.label(), action_color(rec.action)),
        rec.priority
    );

    let (identity, extra_cells) = match report.domain {
        Domain::FieldEvaluator => {
            let identity = format!(
                r#"<div class="mono">{}</div><small>{}</small>"#,
                escape(record.pattern().unwrap_or("(no pattern)")),
                escape(&record.identity.name)
            );
            let cells = format!(
                "<td>{} / {}</td><td>{}</td><td>{}</td><td>{}</td>",
                format_cost(unit, record.cost.max),
                format_cost(unit, record.cost.min),
                group_thousands(record.volume()),
                group_thousands(record.failure_count()),
                escape(&record.source_label)
            );
            (identity, cells)
        }
        Domain::CorrelationRule => {
            let name = escape(&record.identity.name);
            let name = match rule_edit_link(report.domain, record.identity.id.as_deref()) {
                Some(link) => format!(r#"<a href="{}">{}</a>"#, escape(&link), name),
                None => name,
            };
            let folder = record
                .identity
                .group
                .as_deref()
                .map(|g| format!("<br><small>{}</small>", escape(g)))
                .unwrap_or_default();
            let capacity = match record.capacity_eps() {
                eps if eps > 0.0 => group_thousands(eps.round() as u64),
                _ => "-".to_string(),
            };
            let cells = format!(
                "<td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                format_cost(unit, record.cost.max),
                group_thousands(record.volume()),
                group_thousands(record.fired_count().unwrap_or_default()),
                capacity
            );
            (format!("{}{}", name, folder), cells)
        }
    };

    format!(
        r#"<tr><td>{rank}</td><td>{identity}</td><td>{severity}</td><td><strong>{avg}</strong></td>{extra}<td>{action}</td><td><ul class="findings">{findings}</ul></td></tr>"#,
        rank = analysis.rank,
        identity = identity,
        severity = badge(analysis.severity.label(), severity_color(analysis.severity)),
        avg = format_cost(unit, record.cost.average),
        extra = extra_cells,
        action = action,
        findings = findings
    )
}

fn guide(domain: Domain) -> &'static str {
    match domain {
        Domain::FieldEvaluator => {
            r#"<div class="card" style="margin-top:24px;"><h3 style="margin-top:0;">Optimisation guide</h3><div class="guide">
<div><strong>Avoid &rarr; prefer</strong><table>
<tr><th>Avoid</th><th>Prefer</th></tr>
<tr><td class="mono">.*?</td><td class="mono">[^delimiter]+</td></tr>
<tr><td class="mono">(.+)+</td><td class="mono">([^x]+)</td></tr>
<tr><td class="mono">.*field=.*</td><td class="mono">field=([^\s]+)</td></tr>
<tr><td class="mono">(a|b|c|d|e)</td><td class="mono">[abcde]</td></tr>
<tr><td class="mono">^.*?text</td><td class="mono">text</td></tr>
</table></div>
<div><strong>Remediation steps</strong><ol>
<li>Disable properties with active cancellations (TimesCancelled &gt; 0).</li>
<li>Check the event payload and fit the pattern to its real format.</li>
<li>Narrow the scope to specific log sources and event names.</li>
<li>Replace <code>.*?</code> with negated classes <code>[^delimiter]+</code>.</li>
<li>Order log source parsers by volume, highest first.</li>
<li>Turn off unused log source parsers.</li>
</ol></div></div></div>"#
        }
        Domain::CorrelationRule => {
            r#"<div class="card" style="margin-top:24px;"><h3 style="margin-top:0;">Optimisation guide</h3><div class="guide">
<div><strong>Condition order</strong><ol>
<li>Cheap filters first: log source, category, IP, port.</li>
<li>Then property tests and reference set lookups.</li>
<li>Functions, accumulations and payload regexes last.</li>
</ol></div>
<div><strong>Remediation steps</strong><ol>
<li>Disable expensive rules that never fire.</li>
<li>Optimise building blocks first: every dependent rule pays their cost.</li>
<li>Investigate rules whose all-time maximum is far above the average.</li>
<li>Keep per-rule capacity well above the expected event rate.</li>
</ol></div></div></div>"#
        }
    }
}

/// Render the full HTML page.
pub fn render_html(report: &DiagnosticReport, ctx: &RenderContext) -> String {
    let title = format!("costlens: {}", report.domain.title());
    let sources = ctx
        .sources
        .iter()
        .map(|s| escape(s))
        .collect::<Vec<_>>()
        .join(", ");

    let rows: String = report.analyses.iter().map(|a| row(report, a)).collect();
    let table = if rows.is_empty() {
        r#"<div class="card">Nothing above the threshold.</div>"#.to_string()
    } else {
        format!(
            r#"<div style="overflow-x:auto;"><table><thead>{}</thead><tbody>{}</tbody></table></div>"#,
            table_header(report.domain),
            rows
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="header">
<h1>{title}</h1>
<div class="meta">Generated {generated} | Sources: {sources} | Threshold: &ge;{threshold} | Showing top {shown} of {total}</div>
</div>
<div class="content">
{cards}
{summary}
{table}
{guide}
</div>
</body>
</html>
"#,
        title = escape(&title),
        style = STYLE,
        generated = ctx.generated_at.format("%Y-%m-%d %H:%M:%S"),
        sources = sources,
        threshold = format_cost(report.unit, report.min_cost),
        shown = report.analyses.len(),
        total = group_thousands(report.summary.total_analyzed as u64),
        cards = summary_cards(report),
        summary = executive_summary(report),
        table = table,
        guide = guide(report.domain),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{context, field_report, rule_report};

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn test_field_report_escapes_patterns() {
        let html = render_html(&field_report(), &context());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;user&gt;"));
        assert!(!html.contains("<user>"));
        assert!(html.contains("With cancellations"));
        assert!(html.contains("Critical alert:"));
        assert!(html.contains("DISABLE"));
        assert!(html.contains("epfp01.tabular"));
    }

    #[test]
    fn test_rule_report_links_rules() {
        let html = render_html(&rule_report(), &context());
        assert!(html.contains(
            "/console/do/sem/editrule?appName=Sem&amp;pageId=EditRule&amp;ruleId=101"
        ));
        assert!(html.contains("OPTIMIZE_BUILDING_BLOCK"));
        assert!(html.contains("Accumulated test time"));
        assert!(!html.contains("Critical alert:"));
    }
}
