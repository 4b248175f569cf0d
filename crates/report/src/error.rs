//! Report errors.

/// Result alias for rendering.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Format name not recognised
    #[error("unknown output format: {0} (expected html, json or text)")]
    UnknownFormat(String),
}
