//! ColumnTransformer implementation.
//!
//! Applies different transformers to different named column subsets of a
//! [`Table`] and concatenates results.

use crate::preprocessing::encoding::{
    FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams,
};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::Table;
use log::debug;
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Enum of unfitted transformers that can be used in a ColumnTransformer.
#[derive(Clone, Debug)]
pub enum ColumnTransformerStep {
    StandardScaler(StandardScaler),
    OneHotEncoder(OneHotEncoder),
}

/// Enum of fitted transformers for ColumnTransformer.
#[derive(Clone, Debug)]
pub enum FittedColumnTransformerStep {
    StandardScaler(FittedStandardScaler),
    OneHotEncoder(FittedOneHotEncoder),
}

impl ColumnTransformerStep {
    fn fit(
        &self,
        data: &Table,
        columns: &[String],
    ) -> Result<FittedColumnTransformerStep, PreprocessingError> {
        match self {
            ColumnTransformerStep::StandardScaler(t) => t
                .fit(&numeric_block(data, columns)?)
                .map(FittedColumnTransformerStep::StandardScaler),
            ColumnTransformerStep::OneHotEncoder(t) => t
                .fit(&categorical_block(data, columns)?)?
                .with_feature_names(columns.iter().cloned())
                .map(FittedColumnTransformerStep::OneHotEncoder),
        }
    }
}

impl FittedColumnTransformerStep {
    fn transform(
        &self,
        data: &Table,
        columns: &[String],
    ) -> Result<Array2<f64>, PreprocessingError> {
        match self {
            FittedColumnTransformerStep::StandardScaler(t) => {
                t.transform(&numeric_block(data, columns)?)
            }
            FittedColumnTransformerStep::OneHotEncoder(t) => {
                t.transform(&categorical_block(data, columns)?)
            }
        }
    }

    /// Get the step name.
    fn step_name(&self) -> &'static str {
        match self {
            FittedColumnTransformerStep::StandardScaler(_) => "StandardScaler",
            FittedColumnTransformerStep::OneHotEncoder(_) => "OneHotEncoder",
        }
    }

    fn n_features_out(&self) -> usize {
        match self {
            FittedColumnTransformerStep::StandardScaler(t) => t.n_features_out(),
            FittedColumnTransformerStep::OneHotEncoder(t) => t.n_features_out(),
        }
    }

    fn feature_names_out(&self, columns: &[String]) -> Vec<String> {
        match self {
            FittedColumnTransformerStep::StandardScaler(_) => columns.to_vec(),
            FittedColumnTransformerStep::OneHotEncoder(t) => t.feature_names_out(),
        }
    }

    fn params(&self) -> StepParams {
        match self {
            FittedColumnTransformerStep::StandardScaler(t) => {
                StepParams::StandardScaler(t.extract_params())
            }
            FittedColumnTransformerStep::OneHotEncoder(t) => {
                StepParams::OneHotEncoder(t.extract_params())
            }
        }
    }
}

/// Gather numeric columns into a `(rows, columns)` matrix.
fn numeric_block(data: &Table, columns: &[String]) -> Result<Array2<f64>, PreprocessingError> {
    let cols = columns
        .iter()
        .map(|name| data.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Array2::from_shape_fn((data.n_rows(), cols.len()), |(r, c)| {
        cols[c][r]
    }))
}

/// Gather categorical columns, one `Vec<String>` per column.
fn categorical_block(
    data: &Table,
    columns: &[String],
) -> Result<Vec<Vec<String>>, PreprocessingError> {
    columns
        .iter()
        .map(|name| data.categorical(name).map(<[String]>::to_vec))
        .collect()
}

/// ColumnTransformer applies different transformers to different columns.
///
/// Columns are bound by name, so the input table's column order does not
/// matter. Outputs are concatenated horizontally in the order the steps
/// were added.
///
/// # Example
/// ```ignore
/// use carprice::preprocessing::{ColumnTransformer, HandleUnknown, Transformer};
///
/// let ct = ColumnTransformer::new()
///     .add_standard_scaler(StandardScaler::new(), ["year", "kms_driven"])
///     .add_one_hot_encoder(
///         OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore),
///         ["name", "company", "fuel_type"],
///     );
///
/// let fitted = ct.fit(&table)?;
/// let transformed = fitted.transform(&table)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ColumnTransformer {
    steps: Vec<(Vec<String>, ColumnTransformerStep)>,
}

impl ColumnTransformer {
    /// Create a new empty ColumnTransformer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a StandardScaler for the named numeric columns.
    pub fn add_standard_scaler<I, S>(self, scaler: StandardScaler, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(ColumnTransformerStep::StandardScaler(scaler), columns)
    }

    /// Add a OneHotEncoder for the named categorical columns.
    pub fn add_one_hot_encoder<I, S>(self, encoder: OneHotEncoder, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(ColumnTransformerStep::OneHotEncoder(encoder), columns)
    }

    /// Add a generic step.
    pub fn add<I, S>(mut self, step: ColumnTransformerStep, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps
            .push((columns.into_iter().map(Into::into).collect(), step));
        self
    }
}

/// Serializable parameters for one fitted step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StepParams {
    StandardScaler(StandardScalerParams),
    OneHotEncoder(OneHotEncoderParams),
}

/// Serializable parameters for a fitted ColumnTransformer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformerParams {
    /// Number of output features.
    pub n_features_out: usize,
    /// Bound column names and parameters, in output order.
    pub steps: Vec<(Vec<String>, StepParams)>,
}

/// Fitted ColumnTransformer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedColumnTransformer {
    /// Fitted steps with their column names.
    fitted_steps: Vec<(Vec<String>, FittedColumnTransformerStep)>,
    /// Number of output features.
    n_features_out: usize,
}

impl FittedColumnTransformer {
    /// Names of the output columns, e.g. `year` or `fuel_type=Petrol`.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.fitted_steps
            .iter()
            .flat_map(|(cols, step)| step.feature_names_out(cols))
            .collect()
    }

    /// Learned vocabulary of a categorical input column, if one-hot encoded.
    pub fn categories_for(&self, column: &str) -> Option<&[String]> {
        self.fitted_steps.iter().find_map(|(cols, step)| match step {
            FittedColumnTransformerStep::OneHotEncoder(enc) => cols
                .iter()
                .position(|c| c == column)
                .map(|idx| enc.categories()[idx].as_slice()),
            FittedColumnTransformerStep::StandardScaler(_) => None,
        })
    }
}

impl Transformer for ColumnTransformer {
    type Input = Table;
    type Fitted = FittedColumnTransformer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit ColumnTransformer on empty data".to_string(),
            ));
        }

        if self.steps.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "Cannot fit empty ColumnTransformer".to_string(),
            ));
        }

        let mut fitted_steps = Vec::with_capacity(self.steps.len());
        let mut n_features_out = 0;

        for (columns, step) in &self.steps {
            let fitted = step.fit(data, columns)?;
            debug!(
                "fitted {} on {:?} -> {} features",
                fitted.step_name(),
                columns,
                fitted.n_features_out()
            );
            n_features_out += fitted.n_features_out();
            fitted_steps.push((columns.clone(), fitted));
        }

        Ok(FittedColumnTransformer {
            fitted_steps,
            n_features_out,
        })
    }
}

impl FittedTransformer for FittedColumnTransformer {
    type Input = Table;
    type Params = ColumnTransformerParams;

    fn transform(&self, data: &Self::Input) -> Result<Array2<f64>, PreprocessingError> {
        if data.n_rows() == 0 {
            return Ok(Array2::zeros((0, self.n_features_out)));
        }

        let outputs = self
            .fitted_steps
            .iter()
            .map(|(columns, step)| step.transform(data, columns))
            .collect::<Result<Vec<_>, _>>()?;

        let views: Vec<ArrayView2<f64>> = outputs.iter().map(|o| o.view()).collect();
        concatenate(Axis(1), &views).map_err(|e| PreprocessingError::InvalidShape {
            expected: format!("{} rows per step", data.n_rows()),
            got: e.to_string(),
        })
    }

    fn extract_params(&self) -> Self::Params {
        ColumnTransformerParams {
            n_features_out: self.n_features_out,
            steps: self
                .fitted_steps
                .iter()
                .map(|(cols, step)| (cols.clone(), step.params()))
                .collect(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        let mut fitted_steps = Vec::with_capacity(params.steps.len());
        let mut n_features_out = 0;

        for (columns, step) in params.steps {
            let fitted = match step {
                StepParams::StandardScaler(p) => FittedColumnTransformerStep::StandardScaler(
                    FittedStandardScaler::from_params(p)?,
                ),
                StepParams::OneHotEncoder(p) => FittedColumnTransformerStep::OneHotEncoder(
                    FittedOneHotEncoder::from_params(p)?,
                ),
            };
            let n_in = match &fitted {
                FittedColumnTransformerStep::StandardScaler(t) => t.n_features_in(),
                FittedColumnTransformerStep::OneHotEncoder(t) => t.n_features_in(),
            };
            if n_in != columns.len() {
                return Err(PreprocessingError::FeatureMismatch {
                    expected_features: columns.len(),
                    got_features: n_in,
                });
            }
            n_features_out += fitted.n_features_out();
            fitted_steps.push((columns, fitted));
        }

        if n_features_out != params.n_features_out {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} output features", params.n_features_out),
                got: format!("{}", n_features_out),
            });
        }

        Ok(Self {
            fitted_steps,
            n_features_out,
        })
    }

    fn n_features_in(&self) -> usize {
        self.fitted_steps.iter().map(|(cols, _)| cols.len()).sum()
    }

    fn n_features_out(&self) -> usize {
        self.n_features_out
    }
}

/// Scaler on the numeric columns, ignore-unknown one-hot on the categorical ones.
pub fn scale_and_encode<N, C>(numeric: N, categorical: C) -> ColumnTransformer
where
    N: IntoIterator,
    N::Item: Into<String>,
    C: IntoIterator,
    C::Item: Into<String>,
{
    ColumnTransformer::new()
        .add_standard_scaler(StandardScaler::new(), numeric)
        .add_one_hot_encoder(
            OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore),
            categorical,
        )
}
