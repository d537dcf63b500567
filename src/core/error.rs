use thiserror::Error;

use crate::column::ColumnType;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // Transformer lifecycle errors
    #[error("{0} is not fitted yet")]
    NotFitted(String),

    #[error("{step}.{operation} does not support lazy frames; collect the frame first")]
    LazyEvaluationUnsupported { step: String, operation: String },

    #[error("{0} requires a target frame")]
    TargetRequired(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Degenerate column {column}: {statistic} is zero")]
    DegenerateColumn { column: String, statistic: String },

    #[error("{step}: columns mismatch, expected {expected:?}, found {found:?}")]
    ColumnsMismatch {
        step: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    // Frame errors
    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Column type mismatch: column {name}, expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        name: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Shorthand used by steps that only accept materialized frames
    pub(crate) fn lazy(step: &str, operation: &str) -> Self {
        Error::LazyEvaluationUnsupported {
            step: step.to_string(),
            operation: operation.to_string(),
        }
    }
}
