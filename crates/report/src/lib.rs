//! costlens report rendering.
//!
//! Turns a [`DiagnosticReport`](costlens_diagnostics::DiagnosticReport) into
//! an HTML page, a JSON document or a console table. Renderers only
//! present what the engine decided; they never re-derive severities or
//! actions.

#![warn(missing_docs)]

mod error;
mod html;
mod json;
mod output;
mod text;

pub use error::{ReportError, Result};
pub use html::{escape, render_html};
pub use json::render_json;
pub use output::{
    default_file_name, format_cost, render, rule_edit_link, OutputFormat, RenderContext,
};
pub use text::render_text;
