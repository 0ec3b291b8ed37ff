//! One-hot encoding for categorical features.
//!
//! Transforms string categories to one-hot (dummy) indicator columns.

use crate::preprocessing::encoding::HandleUnknown;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use log::warn;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Categorical input: one `Vec<String>` per column, all of equal length.
pub type CategoricalColumns = [Vec<String>];

/// One-hot encoder for categorical features.
///
/// Each input column is treated as a categorical feature, and the encoder
/// learns the sorted distinct values (categories) present in each column
/// during fitting. Output blocks follow input column order; within a block,
/// indicator columns follow category order.
///
/// # Example
/// ```ignore
/// use carprice::preprocessing::{OneHotEncoder, HandleUnknown, Transformer};
///
/// let fuel = vec![vec!["Petrol".into(), "Diesel".into(), "Petrol".into()]];
/// let fitted = OneHotEncoder::new()
///     .with_handle_unknown(HandleUnknown::Ignore)
///     .fit(&fuel)?;
///
/// // Categories sort as ["Diesel", "Petrol"]
/// // [[0, 1],
/// //  [1, 0],
/// //  [0, 1]]
/// let encoded = fitted.transform(&fuel)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    /// How to handle unknown categories during transform.
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Name of each input column.
    pub feature_names: Vec<String>,
    /// Sorted categories for each input column.
    pub categories: Vec<Vec<String>>,
    /// Handle unknown strategy.
    pub handle_unknown: HandleUnknown,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    /// Input column names, `x0`, `x1`, ... unless bound to named columns.
    feature_names: Vec<String>,
    /// Sorted, deduplicated categories for each input column.
    categories: Vec<Vec<String>>,
    /// Offset of each column's block in the output.
    offsets: Vec<usize>,
    n_features_out: usize,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    fn new(
        feature_names: Vec<String>,
        categories: Vec<Vec<String>>,
        handle_unknown: HandleUnknown,
    ) -> Self {
        let mut offsets = Vec::with_capacity(categories.len());
        let mut n_features_out = 0;
        for cats in &categories {
            offsets.push(n_features_out);
            n_features_out += cats.len();
        }
        Self {
            feature_names,
            categories,
            offsets,
            n_features_out,
            handle_unknown,
        }
    }

    /// Name the input columns, e.g. after the table columns they came from.
    pub fn with_feature_names<I, S>(mut self, names: I) -> Result<Self, PreprocessingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.categories.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.categories.len(),
                got_features: names.len(),
            });
        }
        self.feature_names = names;
        Ok(self)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Get the categories learned for each feature.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Get the number of categories per input feature.
    pub fn n_values(&self) -> Vec<usize> {
        self.categories.iter().map(Vec::len).collect()
    }

    /// Output column names as `"<input>=<category>"`.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.feature_names
            .iter()
            .zip(&self.categories)
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{}={}", name, c)))
            .collect()
    }
}

fn column_len(data: &CategoricalColumns) -> Result<usize, PreprocessingError> {
    let rows = data.first().map(Vec::len).unwrap_or(0);
    if let Some(bad) = data.iter().find(|c| c.len() != rows) {
        return Err(PreprocessingError::InvalidShape {
            expected: format!("{} rows in every column", rows),
            got: format!("{} rows", bad.len()),
        });
    }
    Ok(rows)
}

impl Transformer for OneHotEncoder {
    type Input = CategoricalColumns;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let rows = column_len(data)?;
        if rows == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let categories = data
            .iter()
            .map(|col| {
                col.iter()
                    .cloned()
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();

        let feature_names = (0..data.len()).map(|i| format!("x{}", i)).collect();
        Ok(FittedOneHotEncoder::new(
            feature_names,
            categories,
            self.handle_unknown,
        ))
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = CategoricalColumns;
    type Params = OneHotEncoderParams;

    fn transform(&self, data: &Self::Input) -> Result<Array2<f64>, PreprocessingError> {
        if data.len() != self.categories.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.categories.len(),
                got_features: data.len(),
            });
        }
        let rows = column_len(data)?;
        let mut result = Array2::zeros((rows, self.n_features_out));

        for (col, values) in data.iter().enumerate() {
            let cats = &self.categories[col];
            let mut unknown: Option<(&String, usize)> = None;

            for (row, value) in values.iter().enumerate() {
                match cats.binary_search(value) {
                    Ok(idx) => result[[row, self.offsets[col] + idx]] = 1.0,
                    Err(_) => match self.handle_unknown {
                        HandleUnknown::Error => {
                            return Err(PreprocessingError::UnknownCategory {
                                column: self.feature_names[col].clone(),
                                value: value.clone(),
                            })
                        }
                        // Leave the block as zeros
                        HandleUnknown::Ignore => {
                            let (_, count) = unknown.get_or_insert((value, 0));
                            *count += 1;
                        }
                    },
                }
            }

            if let Some((first, count)) = unknown {
                warn!(
                    "{} unknown value(s) in column '{}' (first: '{}') encoded as all zeros",
                    count, self.feature_names[col], first
                );
            }
        }

        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            feature_names: self.feature_names.clone(),
            categories: self.categories.clone(),
            handle_unknown: self.handle_unknown,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.feature_names.len() != params.categories.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.categories.len(),
                got_features: params.feature_names.len(),
            });
        }
        for cats in &params.categories {
            if cats.windows(2).any(|w| w[0] >= w[1]) {
                return Err(PreprocessingError::InvalidParameter(
                    "OneHotEncoder categories must be sorted and unique".to_string(),
                ));
            }
        }
        Ok(FittedOneHotEncoder::new(
            params.feature_names,
            params.categories,
            params.handle_unknown,
        ))
    }

    fn n_features_in(&self) -> usize {
        self.categories.len()
    }

    fn n_features_out(&self) -> usize {
        self.n_features_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_one_hot_encoder_single_column() {
        let data = vec![col(&["Petrol", "Diesel", "LPG"])];
        let fitted = OneHotEncoder::new().fit(&data).unwrap();

        assert_eq!(fitted.n_features_in(), 1);
        assert_eq!(fitted.n_features_out(), 3);
        assert_eq!(fitted.categories()[0], col(&["Diesel", "LPG", "Petrol"]));

        let out = fitted.transform(&data).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(out.row(1).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(out.row(2).to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_one_hot_encoder_multiple_columns() {
        let data = vec![col(&["Honda", "Tata"]), col(&["Petrol", "Petrol"])];
        let fitted = OneHotEncoder::new().fit(&data).unwrap();

        assert_eq!(fitted.n_values(), vec![2, 1]);
        let out = fitted.transform(&data).unwrap();
        assert_eq!(out.dim(), (2, 3));
        assert_eq!(out.row(0).to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(out.row(1).to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_one_hot_encoder_unknown_error() {
        let fitted = OneHotEncoder::new()
            .fit(&[col(&["Petrol", "Diesel"])])
            .unwrap();
        let result = fitted.transform(&[col(&["Electric"])]);
        assert!(matches!(
            result,
            Err(PreprocessingError::UnknownCategory { column, .. }) if column == "x0"
        ));
    }

    #[test]
    fn test_one_hot_encoder_unknown_ignore() {
        let fitted = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Ignore)
            .fit(&[col(&["Petrol", "Diesel"]), col(&["Honda", "Tata"])])
            .unwrap();

        let out = fitted
            .transform(&[col(&["Electric"]), col(&["Tata"])])
            .unwrap();
        // Unknown fuel block is all zeros, known company still encoded
        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_encoder_feature_names_out() {
        let fitted = OneHotEncoder::new()
            .fit(&[col(&["Petrol", "Diesel"])])
            .unwrap();
        assert_eq!(fitted.feature_names_out(), vec!["x0=Diesel", "x0=Petrol"]);

        let named = fitted.with_feature_names(["fuel_type"]).unwrap();
        assert_eq!(
            named.feature_names_out(),
            vec!["fuel_type=Diesel", "fuel_type=Petrol"]
        );
    }

    #[test]
    fn test_unknown_category_reports_column_name() {
        let fitted = OneHotEncoder::new()
            .fit(&[col(&["Honda", "Tata"]), col(&["Petrol", "Diesel"])])
            .unwrap()
            .with_feature_names(["company", "fuel_type"])
            .unwrap();
        match fitted.transform(&[col(&["Tata"]), col(&["Electric"])]) {
            Err(PreprocessingError::UnknownCategory { column, value }) => {
                assert_eq!(column, "fuel_type");
                assert_eq!(value, "Electric");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_with_feature_names_checks_width() {
        let fitted = OneHotEncoder::new().fit(&[col(&["a"])]).unwrap();
        assert!(matches!(
            fitted.with_feature_names(["one", "two"]),
            Err(PreprocessingError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_one_hot_encoder_empty_data() {
        let empty: Vec<Vec<String>> = vec![Vec::new()];
        assert!(matches!(
            OneHotEncoder::new().fit(&empty),
            Err(PreprocessingError::EmptyData(_))
        ));
    }

    #[test]
    fn test_one_hot_encoder_ragged_columns() {
        let data = vec![col(&["a", "b"]), col(&["c"])];
        assert!(matches!(
            OneHotEncoder::new().fit(&data),
            Err(PreprocessingError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_one_hot_encoder_feature_mismatch() {
        let fitted = OneHotEncoder::new().fit(&[col(&["a"])]).unwrap();
        let result = fitted.transform(&[col(&["a"]), col(&["b"])]);
        assert!(matches!(
            result,
            Err(PreprocessingError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_one_hot_encoder_params_roundtrip() {
        let data = vec![col(&["Petrol", "Diesel", "Petrol"])];
        let fitted = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Ignore)
            .fit(&data)
            .unwrap();

        let restored = FittedOneHotEncoder::from_params(fitted.extract_params()).unwrap();
        assert_eq!(restored.categories(), fitted.categories());
        assert_eq!(restored.feature_names(), fitted.feature_names());
        assert_eq!(
            restored.transform(&data).unwrap(),
            fitted.transform(&data).unwrap()
        );
    }

    #[test]
    fn test_from_params_rejects_unsorted_categories() {
        let params = OneHotEncoderParams {
            feature_names: vec!["x0".to_string()],
            categories: vec![col(&["b", "a"])],
            handle_unknown: HandleUnknown::Error,
        };
        assert!(FittedOneHotEncoder::from_params(params).is_err());
    }
}
