//! costlens core data models.
//!
//! Metric records as produced by the ingest adapters, severity bands and
//! their threshold tables, recommendation types, and run configuration.

#![warn(missing_docs)]

mod record;
mod severity;
mod recommendation;

pub mod config;

pub use record::{
    Domain, CostUnit, Identity, CostStats, Signals,
    FieldEvaluatorStats, CorrelationRuleStats, MetricRecord,
};
pub use severity::{SeverityBand, ThresholdTable};
pub use recommendation::{Issue, IssueLevel, Action, Recommendation, DEFAULT_PRIORITY};
pub use config::{AnalyzerConfig, DomainConfig, EngineSettings, ReportSettings, ConfigError};
