//! Loading the used-car training dataset.
//!
//! The dataset is a CSV file with a header row. Required columns are looked
//! up by name (`name`, `company`, `year`, `kms_driven`, `fuel_type`,
//! `price`); anything else, such as a leading index column, is ignored.

use crate::preprocessing::PreprocessingError;
use crate::schema::{ColumnKind, FEATURE_SCHEMA, PRICE};
use crate::table::{Column, Table};
use csv::ReaderBuilder;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading the training dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// `row` is the 1-based data row, not counting the header.
    #[error("Missing value for '{column}' in row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Column '{column}' row {row}: '{value}' is not a number")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Dataset contains no rows")]
    Empty,

    #[error(transparent)]
    Table(#[from] PreprocessingError),
}

/// The feature table and target vector loaded from CSV.
#[derive(Debug, Clone)]
pub struct CarDataset {
    features: Table,
    target: Vec<f64>,
}

enum Builder {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl CarDataset {
    /// Load the dataset from a CSV file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use carprice::dataset::CarDataset;
    ///
    /// let dataset = CarDataset::load("data/cleaned_car_data.csv").unwrap();
    /// println!("{} cars", dataset.len());
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!("loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse the dataset from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };

        let mut columns = FEATURE_SCHEMA
            .iter()
            .map(|d| -> Result<_, DatasetError> {
                let builder = match d.kind {
                    ColumnKind::Numeric => Builder::Numeric(Vec::new()),
                    ColumnKind::Categorical => Builder::Categorical(Vec::new()),
                };
                Ok((d.name, position(d.name)?, builder))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let price_idx = position(PRICE)?;

        let mut target = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let row = i + 1;

            for (name, idx, builder) in columns.iter_mut() {
                let raw = field(&record, *idx, *name, row)?;
                match builder {
                    Builder::Numeric(values) => values.push(parse_number(raw, *name, row)?),
                    Builder::Categorical(values) => values.push(raw.to_string()),
                }
            }
            target.push(parse_number(field(&record, price_idx, PRICE, row)?, PRICE, row)?);
        }

        if target.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut features = Table::new();
        for (name, _, builder) in columns {
            let column = match builder {
                Builder::Numeric(values) => Column::Numeric(values),
                Builder::Categorical(values) => Column::Categorical(values),
            };
            features.insert(name, column)?;
        }

        debug!(
            "parsed dataset: {} rows, {} feature columns",
            features.n_rows(),
            features.n_columns()
        );
        Ok(Self { features, target })
    }

    /// Get the number of samples in the dataset.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn features(&self) -> &Table {
        &self.features
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Select rows by index, in the given order.
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.take_rows(indices),
            target: indices.iter().map(|&i| self.target[i]).collect(),
        }
    }

    /// Shuffle with a fixed seed and split into (train, test).
    pub fn split(&self, test_size: f64, random_state: u64) -> (Self, Self) {
        let (train, test) = train_test_split(self.len(), test_size, random_state);
        (self.take(&train), self.take(&test))
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<&'r str, DatasetError> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DatasetError::MissingValue {
            column: column.to_string(),
            row,
        }),
    }
}

fn parse_number(raw: &str, column: &str, row: usize) -> Result<f64, DatasetError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DatasetError::NotNumeric {
            column: column.to_string(),
            row,
            value: raw.to_string(),
        }),
    }
}

/// Shuffle `0..n_samples` with a seeded RNG and split off the test indices.
///
/// The test set holds `ceil(test_size * n_samples)` samples, clamped so that
/// at least one sample remains for training when `n_samples > 1`.
pub fn train_test_split(
    n_samples: usize,
    test_size: f64,
    random_state: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * test_size.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(n_samples.saturating_sub(1));

    let train = indices.split_off(n_test);
    (train, indices)
}
