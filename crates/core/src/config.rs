//! Run configuration.
//!
//! Defaults reproduce the operational runbook values. A TOML file can
//! override any subset of them:
//!
//! ```toml
//! [field_evaluator.thresholds]
//! critical = 400000
//!
//! [correlation_rule]
//! min_cost_ms = 5.0
//!
//! [engine]
//! reference_eps = 2500
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::record::Domain;
use crate::severity::ThresholdTable;

/// Error type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Threshold table is unusable
    #[error("invalid {domain} thresholds: {reason}")]
    InvalidThresholds {
        /// Offending domain
        domain: Domain,
        /// What is wrong
        reason: String,
    },

    /// Some other setting is out of range
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting {
        /// Setting name
        name: &'static str,
        /// What is wrong
        reason: String,
    },
}

/// Per-domain settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Severity band table, in the domain's unit
    pub thresholds: ThresholdTable,
    /// Records cheaper than this (in milliseconds) are filtered out
    pub min_cost_ms: f64,
}

impl DomainConfig {
    /// Defaults for a domain.
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::FieldEvaluator => Self {
                thresholds: ThresholdTable::FIELD_EVALUATOR,
                min_cost_ms: 0.02,
            },
            Domain::CorrelationRule => Self {
                thresholds: ThresholdTable::CORRELATION_RULE,
                min_cost_ms: 10.0,
            },
        }
    }
}

/// Knobs the recommendation engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Event rate used to express per-event cost as CPU load
    pub reference_eps: f64,
    /// Capacity below this (events/s) is reported as pressure
    pub capacity_floor_eps: f64,
    /// Substring marking shared building-block rules
    pub building_block_marker: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reference_eps: 1000.0,
            capacity_floor_eps: 500_000.0,
            building_block_marker: "BB".to_string(),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Number of records rendered in detail
    pub top: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { top: 100 }
    }
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Field evaluator settings
    pub field_evaluator: DomainConfig,
    /// Correlation rule settings
    pub correlation_rule: DomainConfig,
    /// Engine settings
    pub engine: EngineSettings,
    /// Report settings
    pub report: ReportSettings,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            field_evaluator: DomainConfig::for_domain(Domain::FieldEvaluator),
            correlation_rule: DomainConfig::for_domain(Domain::CorrelationRule),
            engine: EngineSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load overrides from a TOML file on top of the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse overrides from TOML text on top of the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let overrides: ConfigOverrides = toml::from_str(text)?;
        let mut config = Self::default();
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Settings for a domain.
    pub fn domain(&self, domain: Domain) -> &DomainConfig {
        match domain {
            Domain::FieldEvaluator => &self.field_evaluator,
            Domain::CorrelationRule => &self.correlation_rule,
        }
    }

    /// Mutable settings for a domain.
    pub fn domain_mut(&mut self, domain: Domain) -> &mut DomainConfig {
        match domain {
            Domain::FieldEvaluator => &mut self.field_evaluator,
            Domain::CorrelationRule => &mut self.correlation_rule,
        }
    }

    /// Reject configurations the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        for domain in [Domain::FieldEvaluator, Domain::CorrelationRule] {
            let cfg = self.domain(domain);
            cfg.thresholds
                .check()
                .map_err(|reason| ConfigError::InvalidThresholds { domain, reason })?;
            if !cfg.min_cost_ms.is_finite() || cfg.min_cost_ms < 0.0 {
                return Err(ConfigError::InvalidSetting {
                    name: "min_cost_ms",
                    reason: format!("must be a non-negative number, got {}", cfg.min_cost_ms),
                });
            }
        }
        for (name, value) in [
            ("reference_eps", self.engine.reference_eps),
            ("capacity_floor_eps", self.engine.capacity_floor_eps),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        Ok(())
    }

    fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(section) = overrides.field_evaluator {
            section.apply_to(&mut self.field_evaluator);
        }
        if let Some(section) = overrides.correlation_rule {
            section.apply_to(&mut self.correlation_rule);
        }
        if let Some(engine) = overrides.engine {
            if let Some(v) = engine.reference_eps {
                self.engine.reference_eps = v;
            }
            if let Some(v) = engine.capacity_floor_eps {
                self.engine.capacity_floor_eps = v;
            }
            if let Some(v) = engine.building_block_marker {
                self.engine.building_block_marker = v;
            }
        }
        if let Some(report) = overrides.report {
            if let Some(top) = report.top {
                self.report.top = top;
            }
        }
    }
}

// On-disk shape: every field optional so a file may override a single value.

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    field_evaluator: Option<DomainOverrides>,
    correlation_rule: Option<DomainOverrides>,
    engine: Option<EngineOverrides>,
    report: Option<ReportOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DomainOverrides {
    thresholds: Option<ThresholdOverrides>,
    min_cost_ms: Option<f64>,
}

impl DomainOverrides {
    fn apply_to(self, cfg: &mut DomainConfig) {
        if let Some(t) = self.thresholds {
            if let Some(v) = t.critical {
                cfg.thresholds.critical = v;
            }
            if let Some(v) = t.high {
                cfg.thresholds.high = v;
            }
            if let Some(v) = t.medium {
                cfg.thresholds.medium = v;
            }
        }
        if let Some(v) = self.min_cost_ms {
            cfg.min_cost_ms = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdOverrides {
    critical: Option<f64>,
    high: Option<f64>,
    medium: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineOverrides {
    reference_eps: Option<f64>,
    capacity_floor_eps: Option<f64>,
    building_block_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportOverrides {
    top: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_runbook() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.field_evaluator.thresholds, ThresholdTable::FIELD_EVALUATOR);
        assert_eq!(config.correlation_rule.thresholds, ThresholdTable::CORRELATION_RULE);
        assert_eq!(config.field_evaluator.min_cost_ms, 0.02);
        assert_eq!(config.correlation_rule.min_cost_ms, 10.0);
        assert_eq!(config.engine.reference_eps, 1000.0);
        assert_eq!(config.engine.capacity_floor_eps, 500_000.0);
        assert_eq!(config.engine.building_block_marker, "BB");
        assert_eq!(config.report.top, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
[field_evaluator.thresholds]
critical = 400000.0

[correlation_rule]
min_cost_ms = 5.0

[engine]
building_block_marker = "Building Block"

[report]
top = 25
"#;
        let config = AnalyzerConfig::from_toml_str(text).unwrap();
        assert_eq!(config.field_evaluator.thresholds.critical, 400_000.0);
        assert_eq!(config.field_evaluator.thresholds.high, 200_000.0);
        assert_eq!(config.correlation_rule.min_cost_ms, 5.0);
        assert_eq!(config.correlation_rule.thresholds, ThresholdTable::CORRELATION_RULE);
        assert_eq!(config.engine.building_block_marker, "Building Block");
        assert_eq!(config.engine.reference_eps, 1000.0);
        assert_eq!(config.report.top, 25);
    }

    #[test]
    fn test_integer_values_accepted() {
        let config = AnalyzerConfig::from_toml_str("[engine]\nreference_eps = 2500\n").unwrap();
        assert_eq!(config.engine.reference_eps, 2500.0);

        let text = "[field_evaluator.thresholds]\ncritical = 900000\nhigh = 300000\n";
        let config = AnalyzerConfig::from_toml_str(text).unwrap();
        assert_eq!(config.field_evaluator.thresholds.critical, 900_000.0);
        assert_eq!(config.field_evaluator.thresholds.high, 300_000.0);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let text = "[correlation_rule.thresholds]\nhigh = 150.0\n";
        let err = AnalyzerConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThresholds { domain: Domain::CorrelationRule, .. }
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = AnalyzerConfig::from_toml_str("[engine]\nreference = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costlens.toml");
        std::fs::write(&path, "[report]\ntop = 7\n").unwrap();

        let config = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(config.report.top, 7);

        let missing = AnalyzerConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
