//! Error types for preprocessing operations.

use crate::schema::ColumnKind;
use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Shape mismatch between expected and actual dimensions.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
    /// Numerical computation error (non-finite input, overflow).
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Invalid hyperparameter or configuration value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// A column the transformer is bound to is absent from the input table.
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// A column exists but holds the wrong kind of values.
    #[error("Column '{column}' is {got:?}, expected {expected:?}")]
    ColumnType {
        column: String,
        expected: ColumnKind,
        got: ColumnKind,
    },
    /// A categorical value not seen during fit, with `HandleUnknown::Error`.
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },
}

impl From<std::io::Error> for PreprocessingError {
    fn from(err: std::io::Error) -> Self {
        PreprocessingError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}
