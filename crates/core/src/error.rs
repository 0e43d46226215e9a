//! Error types for vrag.
//!
//! A single error enum covers every failure category the ingestion and query
//! pipelines can surface: configuration, backend connectivity, empty
//! embeddings, malformed chunk metadata, vector storage, model and prompt
//! failures.

use thiserror::Error;

/// Unified error type for vrag.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Provider-specific failures (HTTP, LanceDB, PDF parsing) are folded into one
/// of these variants at the boundary where they occur.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid required setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding or generation backend unreachable
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Embedding call succeeded but returned no usable vector
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Chunk is missing the source or page needed for id assignment
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    /// Vector index read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Language model rejected or failed the request
    #[error("Model error: {0}")]
    Model(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Document loading errors (unreadable or unparsable PDFs)
    #[error("Document error: {0}")]
    Document(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this failure points at the embedding/generation backend
    /// (service down, model missing) rather than at local input.
    ///
    /// The query command uses this to decide whether to print the
    /// "is the backend running" hint.
    pub fn is_backend_failure(&self) -> bool {
        match self {
            AppError::Connectivity(_) | AppError::Model(_) | AppError::EmptyResult(_) => true,
            other => other.to_string().to_lowercase().contains("model"),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failures_are_flagged() {
        assert!(AppError::Connectivity("refused".to_string()).is_backend_failure());
        assert!(AppError::Model("model 'x' not found".to_string()).is_backend_failure());
        assert!(AppError::EmptyResult("zero-length vector".to_string()).is_backend_failure());
    }

    #[test]
    fn test_config_error_mentioning_model_is_flagged() {
        let err = AppError::Config("LLM_QUERY_MODEL is not set".to_string());
        assert!(err.is_backend_failure());
    }

    #[test]
    fn test_local_failures_are_not_flagged() {
        assert!(!AppError::MalformedMetadata("chunk 3 has no page".to_string()).is_backend_failure());
        assert!(!AppError::Storage("disk full".to_string()).is_backend_failure());
    }

    #[test]
    fn test_display_prefixes() {
        let err = AppError::Storage("table missing".to_string());
        assert_eq!(err.to_string(), "Storage error: table missing");
    }
}
