//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;
use ndarray::Array2;

/// Trait for unfitted transformers with hyperparameters.
///
/// Fitting consumes nothing and produces a separate fitted type, so a
/// configuration can never be used for inference and a fitted transformer
/// can never be refitted in place.
///
/// # Example
/// ```ignore
/// use carprice::preprocessing::{StandardScaler, Transformer, FittedTransformer};
///
/// let fitted = StandardScaler::new().fit(&data)?;
/// let transformed = fitted.transform(&new_data)?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for fitting and transformation.
    type Input: ?Sized;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Input = Self::Input>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if:
    /// - Data is empty
    /// - Data contains invalid values (NaN, Inf)
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit the transformer and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Array2<f64>, PreprocessingError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `transform` takes `&self` and never changes learned state.
/// - `extract_params()` + `from_params()` is a round-trip.
pub trait FittedTransformer: Clone {
    /// Input data type for transformation.
    type Input: ?Sized;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the input width doesn't match the
    /// number of features seen during fit, or contains invalid values.
    fn transform(&self, data: &Self::Input) -> Result<Array2<f64>, PreprocessingError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        let params = self.extract_params();
        let bytes = params.to_bytes().map_err(std::io::Error::other)?;
        std::fs::write(path, bytes)
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PreprocessingError>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        let params = Self::Params::from_bytes(&bytes)
            .map_err(|e| PreprocessingError::SerializationError(e.to_string()))?;
        Self::from_params(params)
    }

    /// Returns the number of input features seen during fit.
    fn n_features_in(&self) -> usize;

    /// Returns the number of output features produced by `transform`.
    fn n_features_out(&self) -> usize;
}
