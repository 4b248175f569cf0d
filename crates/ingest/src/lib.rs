//! costlens ingest.
//!
//! Adapters from tab-separated performance exports to [`MetricRecord`]s.
//! Unparseable cells are absorbed here as zeros so the diagnostics only
//! ever see fully populated records.
//!
//! [`MetricRecord`]: costlens_core::MetricRecord

#![warn(missing_docs)]

mod correlation_rule;
mod error;
mod field_evaluator;
mod source;
mod tabular;

pub use correlation_rule::parse_correlation_rules;
pub use error::{IngestError, Result};
pub use field_evaluator::parse_field_evaluators;
pub use source::{load_all, TabularFileSource, TelemetrySource};
pub use tabular::{mbean_attribute, Row, Table};
