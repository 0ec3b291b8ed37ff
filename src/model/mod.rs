//! Regression models.
//!
//! Models use the same typestate split as the preprocessing transformers:
//! `LinearModel<Unfitted>` holds hyperparameters and can only be fitted,
//! `LinearModel<Fitted>` implements [`InferenceModel`].

pub mod linear;
mod lstsq;
pub mod state;

pub use linear::{LinearModel, LinearParams, LinearRegression, SerializableLinearParams};
pub use state::{Fitted, Unfitted};

use crate::serialization::SerializableParams;
use thiserror::Error;

/// Errors raised while fitting or evaluating a model.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Cannot fit on empty data")]
    EmptyData,

    #[error("Length mismatch: {samples} samples but {targets} targets")]
    LengthMismatch { samples: usize, targets: usize },

    #[error("Feature mismatch: model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("Least squares solve failed: {0}")]
    Solver(&'static str),
}

/// A fitted model ready for inference.
pub trait InferenceModel: Sized {
    type InputSingle: ?Sized;
    type InputBatch: ?Sized;
    type OutputSingle;
    type OutputBatch;
    type ParamsRepr: SerializableParams;

    /// Predict on a single sample.
    fn predict(&self, input: &Self::InputSingle) -> Result<Self::OutputSingle, ModelError>;

    /// Predict on a batch of samples, one output per row.
    fn predict_batch(&self, input: &Self::InputBatch) -> Result<Self::OutputBatch, ModelError>;

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError>;

    /// Save the model parameters to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(std::io::Error::other)?;
        std::fs::write(path, bytes)
    }

    /// Load model parameters from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let params = Self::ParamsRepr::from_bytes(&bytes).map_err(std::io::Error::other)?;
        Self::from_params(params).map_err(std::io::Error::other)
    }
}
