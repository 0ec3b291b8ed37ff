//! The price pipeline: feature transformer followed by linear regression.
//!
//! Lifecycle: `PricePipeline<Unfitted>` is fitted exactly once into a
//! `PricePipeline<Fitted>`, which can be persisted, loaded back and used for
//! any number of predictions. Prediction takes `&self` and never changes
//! learned state, so a loaded pipeline can be shared across threads.
//!
//! # Example
//! ```ignore
//! use carprice::pipeline::PricePipeline;
//!
//! let fitted = PricePipeline::new().fit(&features, &prices)?;
//! fitted.save_to_file("pipeline.bin")?;
//!
//! let loaded = PricePipeline::load_from_file("pipeline.bin")?;
//! let predictions = loaded.predict(&inference_row)?;
//! ```

use crate::error::{Error, Result};
use crate::model::{
    Fitted, InferenceModel, LinearModel, LinearRegression, SerializableLinearParams, Unfitted,
};
use crate::preprocessing::{
    scale_and_encode, ColumnTransformer, ColumnTransformerParams, FittedColumnTransformer,
    FittedTransformer, Transformer,
};
use crate::schema;
use crate::serialization::SerializableParams;
use crate::table::Table;
use log::{debug, info};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Leading tag of every persisted pipeline.
pub const ARTIFACT_MAGIC: [u8; 8] = *b"CARPRICE";

/// Bumped whenever [`PricePipelineParams`] changes shape.
pub const FORMAT_VERSION: u32 = 1;

/// What a pipeline holds in each lifecycle state.
pub trait PipelineState {
    type Transformer: Clone + std::fmt::Debug;
    type Model: Clone + std::fmt::Debug;
}

impl PipelineState for Unfitted {
    type Transformer = ColumnTransformer;
    type Model = LinearRegression;
}

impl PipelineState for Fitted {
    type Transformer = FittedColumnTransformer;
    type Model = LinearModel<Fitted>;
}

/// Feature transformer plus regression model.
#[derive(Clone, Debug)]
pub struct PricePipeline<S: PipelineState = Fitted> {
    transformer: S::Transformer,
    model: S::Model,
}

/// Full-state snapshot written by [`PricePipeline::save_to_file`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePipelineParams {
    pub magic: [u8; 8],
    pub version: u32,
    pub transformer: ColumnTransformerParams,
    pub model: SerializableLinearParams,
}

impl Default for PricePipeline<Unfitted> {
    fn default() -> Self {
        Self::new()
    }
}

impl PricePipeline<Unfitted> {
    /// Scale the numeric schema columns, one-hot encode the categorical ones
    /// (unknown values ignored), then fit OLS with an intercept.
    pub fn new() -> Self {
        Self {
            transformer: scale_and_encode(schema::numeric_columns(), schema::categorical_columns()),
            model: LinearRegression::new(),
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.model = self.model.with_intercept(fit_intercept);
        self
    }

    /// Fit the transformer on `features`, then the model on the transformed
    /// matrix and `target`.
    pub fn fit(&self, features: &Table, target: &[f64]) -> Result<PricePipeline<Fitted>> {
        schema::validate(features)?;

        let transformer = self.transformer.fit(features)?;
        let x = transformer.transform(features)?;
        debug!("transformed training matrix: {} x {}", x.nrows(), x.ncols());

        let y = Array1::from(target.to_vec());
        let model = self.model.fit(&x, &y)?;

        info!(
            "fitted pipeline on {} rows ({} input columns -> {} features)",
            features.n_rows(),
            transformer.n_features_in(),
            transformer.n_features_out()
        );
        Ok(PricePipeline { transformer, model })
    }
}

impl PricePipeline<Fitted> {
    /// Predict one price per row of `features`, in row order.
    pub fn predict(&self, features: &Table) -> Result<Array1<f64>> {
        let x = self.transformer.transform(features)?;
        Ok(self.model.predict_batch(&x)?)
    }

    pub fn model(&self) -> &LinearModel<Fitted> {
        &self.model
    }

    /// Training vocabulary of a categorical column.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.transformer.categories_for(column)
    }

    pub fn feature_names_out(&self) -> Vec<String> {
        self.transformer.feature_names_out()
    }

    pub fn extract_params(&self) -> PricePipelineParams {
        PricePipelineParams {
            magic: ARTIFACT_MAGIC,
            version: FORMAT_VERSION,
            transformer: self.transformer.extract_params(),
            model: self.model.extract_params(),
        }
    }

    /// Rebuild a fitted pipeline, checking the tag, the format version and
    /// that the transformer output width matches the model weights.
    pub fn from_params(params: PricePipelineParams) -> Result<Self> {
        if params.magic != ARTIFACT_MAGIC {
            return Err(Error::Artifact("not a carprice pipeline".to_string()));
        }
        if params.version != FORMAT_VERSION {
            return Err(Error::Artifact(format!(
                "unsupported format version {} (expected {})",
                params.version, FORMAT_VERSION
            )));
        }

        let transformer = FittedColumnTransformer::from_params(params.transformer)
            .map_err(|e| Error::Artifact(e.to_string()))?;
        let model = LinearModel::<Fitted>::from_params(params.model)
            .map_err(|e| Error::Artifact(e.to_string()))?;

        if transformer.n_features_out() != model.n_features() {
            return Err(Error::Artifact(format!(
                "transformer produces {} features but model has {} weights",
                transformer.n_features_out(),
                model.n_features()
            )));
        }

        Ok(Self { transformer, model })
    }

    /// Write the full fitted state to `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| Error::Artifact(e.to_string()))?;
        std::fs::write(path, &bytes)?;
        info!("saved pipeline to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Load a pipeline written by [`PricePipeline::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let params = PricePipelineParams::from_bytes(&bytes)
            .map_err(|e| Error::Artifact(format!("corrupt artifact: {}", e)))?;
        let pipeline = Self::from_params(params)?;
        info!(
            "loaded pipeline from {} ({} features)",
            path.display(),
            pipeline.model.n_features()
        );
        Ok(pipeline)
    }
}
