//! Output formats and file naming.

use std::str::FromStr;

use chrono::NaiveDateTime;
use costlens_core::{CostUnit, Domain};
use costlens_diagnostics::DiagnosticReport;

use crate::error::{ReportError, Result};
use crate::{html, json, text};

/// Rendered artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Self-contained HTML page
    #[default]
    Html,
    /// JSON document
    Json,
    /// Plain-text table
    Text,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// Facts about the run that are not part of the diagnostics.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// When the report was generated
    pub generated_at: NaiveDateTime,
    /// Input labels, in load order
    pub sources: Vec<String>,
}

/// `costlens_<domain>_<YYYYMMDD-HHMMSS>.<ext>`
pub fn default_file_name(domain: Domain, format: OutputFormat, at: NaiveDateTime) -> String {
    format!(
        "costlens_{}_{}.{}",
        domain.slug(),
        at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Render `report` in `format`.
pub fn render(report: &DiagnosticReport, format: OutputFormat, ctx: &RenderContext) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(html::render_html(report, ctx)),
        OutputFormat::Json => json::render_json(report, ctx),
        OutputFormat::Text => Ok(text::render_text(report, ctx)),
    }
}

/// Cost in milliseconds with the precision the domain is read at.
pub fn format_cost(unit: CostUnit, value: f64) -> String {
    match unit {
        CostUnit::Nanoseconds => format!("{:.3}ms", unit.to_millis(value)),
        CostUnit::Milliseconds => format!("{:.1}ms", unit.to_millis(value)),
    }
}

/// Console edit link for a correlation rule with a known id.
pub fn rule_edit_link(domain: Domain, id: Option<&str>) -> Option<String> {
    match (domain, id) {
        (Domain::CorrelationRule, Some(id)) if !id.is_empty() => Some(format!(
            "/console/do/sem/editrule?appName=Sem&pageId=EditRule&ruleId={}",
            id
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 30)
            .unwrap()
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name(Domain::FieldEvaluator, OutputFormat::Html, at()),
            "costlens_properties_20240309-070530.html"
        );
        assert_eq!(
            default_file_name(Domain::CorrelationRule, OutputFormat::Text, at()),
            "costlens_rules_20240309-070530.txt"
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!(matches!(
            "pdf".parse::<OutputFormat>(),
            Err(ReportError::UnknownFormat(name)) if name == "pdf"
        ));
        assert_eq!(OutputFormat::default().to_string(), "html");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(CostUnit::Nanoseconds, 61_000.0), "0.061ms");
        assert_eq!(format_cost(CostUnit::Milliseconds, 125.04), "125.0ms");
    }

    #[test]
    fn test_rule_edit_link() {
        assert_eq!(
            rule_edit_link(Domain::CorrelationRule, Some("101")).as_deref(),
            Some("/console/do/sem/editrule?appName=Sem&pageId=EditRule&ruleId=101")
        );
        assert_eq!(rule_edit_link(Domain::CorrelationRule, None), None);
        assert_eq!(rule_edit_link(Domain::FieldEvaluator, Some("7")), None);
    }
}
