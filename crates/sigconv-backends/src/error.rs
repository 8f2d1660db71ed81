//! Backend-specific error types.

use thiserror::Error;

/// Errors that can occur while generating queries from a condition tree.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The condition tree violates the node contract (a defect in the
    /// upstream parser, not a recoverable condition).
    #[error("malformed condition tree: {0}")]
    MalformedTree(String),

    /// This backend cannot render the given construct.
    #[error("not implemented for this backend: {0}")]
    NotImplemented(String),

    /// The target format fundamentally cannot express a required feature.
    #[error("not supported by the target format: {0}")]
    NotSupported(String),

    /// A list or map value is neither a scalar nor a list of scalars.
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// No active backend matches the requested identifier.
    #[error("backend not found: {0}")]
    UnknownBackend(String),

    /// An escape/strip pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A mapping table failed to load.
    #[error("invalid field mapping: {0}")]
    InvalidMapping(String),

    /// Writing to the output sink failed. Fatal to the run.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a structured document failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BackendError>;
