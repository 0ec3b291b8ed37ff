//! Crate-level error type.

use crate::dataset::DatasetError;
use crate::form::FormError;
use crate::model::ModelError;
use crate::preprocessing::PreprocessingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Preprocessing failed: {0}")]
    Preprocessing(#[from] PreprocessingError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Invalid input: {0}")]
    Form(#[from] FormError),

    /// The persisted pipeline could not be reconstructed.
    #[error("Invalid pipeline artifact: {0}")]
    Artifact(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
