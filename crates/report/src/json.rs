//! JSON report.

use serde::Serialize;

use costlens_diagnostics::DiagnosticReport;

use crate::error::Result;
use crate::output::RenderContext;

#[derive(Serialize)]
struct Document<'a> {
    generated_at: String,
    sources: &'a [String],
    #[serde(flatten)]
    report: &'a DiagnosticReport,
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &DiagnosticReport, ctx: &RenderContext) -> Result<String> {
    let document = Document {
        generated_at: ctx.generated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        sources: &ctx.sources,
        report,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{context, rule_report};

    #[test]
    fn test_json_document() {
        let json = render_json(&rule_report(), &context()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["generated_at"], "2024-03-09T07:05:30");
        assert_eq!(value["sources"][0], "epfp01.tabular");
        assert_eq!(value["domain"], "correlation_rule");
        assert_eq!(value["summary"]["total_analyzed"], 2);

        let first = &value["analyses"][0];
        assert_eq!(first["rank"], 1);
        assert_eq!(first["severity"], "HIGH");
        assert_eq!(first["recommendation"]["action"], "OPTIMIZE_BUILDING_BLOCK");
        assert_eq!(first["record"]["signals"]["domain"], "correlation_rule");
        assert_eq!(first["record"]["signals"]["test_count"], 400);
    }
}
