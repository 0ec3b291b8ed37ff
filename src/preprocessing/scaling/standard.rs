//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation (ddof = 0). Constant features get `s = 1`.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Mean of each feature.
    pub mean: Vec<f64>,
    /// Scale of each feature (population std, 1.0 for constant features).
    pub scale: Vec<f64>,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Create a new StandardScaler.
    pub fn new() -> Self {
        Self
    }
}

fn ensure_finite(data: &Array2<f64>) -> Result<(), PreprocessingError> {
    if let Some(((row, col), val)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PreprocessingError::NumericalError(format!(
            "non-finite value {} at ({}, {})",
            val, row, col
        )));
    }
    Ok(())
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let (rows, cols) = data.dim();

        if rows == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }
        ensure_finite(data)?;

        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(cols));
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(FittedStandardScaler { mean, scale })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Get the scale (standard deviation) for each feature.
    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Array2<f64>, PreprocessingError> {
        let (_, cols) = data.dim();

        if cols != self.n_features_in() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features_in(),
                got_features: cols,
            });
        }
        ensure_finite(data)?;

        Ok((data - &self.mean) / &self.scale)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            mean: self.mean.to_vec(),
            scale: self.scale.to_vec(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.mean.len() != params.scale.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} scale values", params.mean.len()),
                got: format!("{}", params.scale.len()),
            });
        }
        if params.scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(
                "StandardScaler scale must be finite and non-zero".to_string(),
            ));
        }

        Ok(Self {
            mean: Array1::from(params.mean),
            scale: Array1::from(params.scale),
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn n_features_out(&self) -> usize {
        self.mean.len()
    }
}
