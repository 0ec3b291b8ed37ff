//! Ordinary least squares linear regression.
//!
//! The model is fitted in closed form: inputs and targets are centred, the
//! least squares system is solved for the minimum-norm weights and the
//! intercept is recovered from the column means.

use crate::model::lstsq::solve_min_norm;
use crate::model::{Fitted, InferenceModel, ModelError, Unfitted};
use log::debug;
use ndarray::{Array1, Array2, Axis};
use std::marker::PhantomData;

#[derive(Clone, Debug, PartialEq)]
pub struct LinearParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SerializableLinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub fit_intercept: bool,
}

impl TryFrom<SerializableLinearParams> for LinearParams {
    type Error = ModelError;

    fn try_from(value: SerializableLinearParams) -> Result<Self, Self::Error> {
        if !value.bias.is_finite() || value.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::NonFinite("model parameters"));
        }
        Ok(Self {
            weights: Array1::from(value.weights),
            bias: value.bias,
        })
    }
}

#[derive(Clone, Debug)]
pub struct LinearModel<S> {
    params: LinearParams,
    fit_intercept: bool,
    _state: PhantomData<S>,
}

impl LinearModel<Fitted> {
    /// Create a new fitted linear model from params.
    pub fn new(params: LinearParams, fit_intercept: bool) -> Self {
        Self {
            params,
            fit_intercept,
            _state: PhantomData,
        }
    }

    /// Whether the intercept was learned (`false` means it is fixed at zero).
    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.params.weights
    }

    pub fn intercept(&self) -> f64 {
        self.params.bias
    }

    pub fn n_features(&self) -> usize {
        self.params.weights.len()
    }

    fn check_width(&self, got: usize) -> Result<(), ModelError> {
        if got != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got,
            });
        }
        Ok(())
    }
}

impl InferenceModel for LinearModel<Fitted> {
    type InputSingle = Array1<f64>;
    type InputBatch = Array2<f64>;
    type OutputSingle = f64;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = SerializableLinearParams;

    /// Predict on a single sample (feature vector).
    fn predict(&self, input: &Self::InputSingle) -> Result<f64, ModelError> {
        self.check_width(input.len())?;
        Ok(self.params.weights.dot(input) + self.params.bias)
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Result<Array1<f64>, ModelError> {
        self.check_width(input.ncols())?;
        Ok(input.dot(&self.params.weights) + self.params.bias)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        SerializableLinearParams {
            weights: self.params.weights.to_vec(),
            bias: self.params.bias,
            fit_intercept: self.fit_intercept,
        }
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError> {
        let fit_intercept = params.fit_intercept;
        Ok(Self::new(LinearParams::try_from(params)?, fit_intercept))
    }
}

pub type LinearRegression = LinearModel<Unfitted>;

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            params: LinearParams {
                weights: Array1::zeros(0),
                bias: 0.0,
            },
            fit_intercept: true,
            _state: PhantomData,
        }
    }

    /// Whether to fit an intercept. Without one, the data is not centred.
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fit ordinary least squares on `x` (samples × features) and `y`.
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel<Fitted>, ModelError> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(ModelError::EmptyData);
        }
        if y.len() != n_samples {
            return Err(ModelError::LengthMismatch {
                samples: n_samples,
                targets: y.len(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("features"));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("targets"));
        }

        let (x_mean, y_mean) = if self.fit_intercept {
            (
                x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_features)),
                y.mean().unwrap_or(0.0),
            )
        } else {
            (Array1::zeros(n_features), 0.0)
        };

        let xc = x - &x_mean;
        let yc = y - y_mean;

        let weights = solve_min_norm(&xc, &yc)?;
        let bias = y_mean - x_mean.dot(&weights);

        debug!(
            "fitted linear model on {} samples x {} features, intercept {}",
            n_samples, n_features, bias
        );

        Ok(LinearModel {
            params: LinearParams { weights, bias },
            fit_intercept: self.fit_intercept,
            _state: PhantomData,
        })
    }
}
