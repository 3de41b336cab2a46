//! Error types for the biomap library.

use thiserror::Error;

/// Main error type for mapping operations.
#[derive(Debug, Error)]
pub enum MapperError {
    /// A local identifier failed validation while fail-fast was requested.
    #[error("Local id '{local_id}' in field '{field}' is invalid for {vocabularies:?}")]
    InvalidIdentifier {
        field: String,
        local_id: String,
        vocabularies: Vec<String>,
    },

    /// Unknown annotation mode.
    #[error("Invalid annotation mode '{0}'. Must be one of: all, missing, none")]
    InvalidMode(String),

    /// An annotator slug that is not registered with the engine.
    #[error("Unknown annotator '{0}'")]
    UnknownAnnotator(String),

    /// Annotation was requested but no annotator was selected.
    #[error("No annotators selected for annotation")]
    NoAnnotators,

    /// A category that the taxonomy service does not know.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A stage produced a different number of rows than it was given.
    #[error("Row count changed: expected {expected} rows, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    /// Fault reported by an external service.
    #[error("{service} error: {message}")]
    Service { service: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl MapperError {
    /// Build a service fault.
    pub fn service(service: impl Into<String>, message: impl Into<String>) -> Self {
        MapperError::Service {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MapperError>;
