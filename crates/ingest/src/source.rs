//! Telemetry sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use costlens_core::{Domain, MetricRecord};

use crate::correlation_rule::parse_correlation_rules;
use crate::error::Result;
use crate::field_evaluator::parse_field_evaluators;

/// Something that yields metric records of one domain.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Domain of the records this source yields.
    fn domain(&self) -> Domain;

    /// Short provenance label.
    fn label(&self) -> String;

    /// Read and parse every record.
    async fn load(&self) -> Result<Vec<MetricRecord>>;
}

/// A tab-separated export on disk.
#[derive(Debug, Clone)]
pub struct TabularFileSource {
    path: PathBuf,
    domain: Domain,
}

impl TabularFileSource {
    /// Create a source for `path`.
    pub fn new(path: impl Into<PathBuf>, domain: Domain) -> Self {
        Self {
            path: path.into(),
            domain,
        }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TelemetrySource for TabularFileSource {
    fn domain(&self) -> Domain {
        self.domain
    }

    fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    async fn load(&self) -> Result<Vec<MetricRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        // exports are not always clean UTF-8
        let text = String::from_utf8_lossy(&bytes);
        let label = self.label();
        match self.domain {
            Domain::FieldEvaluator => Ok(parse_field_evaluators(&text, &label)),
            Domain::CorrelationRule => Ok(parse_correlation_rules(&text, &label)),
        }
    }
}

/// Load every source concurrently and concatenate in source order.
///
/// Missing files are logged and skipped; any other failure aborts.
pub async fn load_all(sources: Vec<Box<dyn TelemetrySource>>) -> Result<Vec<MetricRecord>> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            tokio::spawn(async move {
                let label = source.label();
                (label, source.load().await)
            })
        })
        .collect();

    let mut records = Vec::new();
    for handle in handles {
        let (label, result) = handle.await?;
        match result {
            Ok(loaded) => {
                tracing::info!("Loaded {} records from {}", loaded.len(), label);
                records.extend(loaded);
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("Input not found, skipping: {}", label);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}
