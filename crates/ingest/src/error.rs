//! Ingest errors.

/// Result alias for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that can occur while loading telemetry exports.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A loader task panicked or was cancelled
    #[error("loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IngestError {
    /// Whether this is a missing input file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IngestError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
