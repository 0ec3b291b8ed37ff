//! Form input for a single prediction.
//!
//! A [`CarForm`] holds the raw text of the five inputs. Parsing it yields a
//! validated [`PredictionRequest`], which assembles the one-row inference
//! table from [`FEATURE_SCHEMA`]. [`FormOptions`] lists the choices offered
//! for the categorical inputs, taken from the loaded pipeline's vocabulary.

use crate::error::Result;
use crate::model::Fitted;
use crate::pipeline::PricePipeline;
use crate::preprocessing::PreprocessingError;
use crate::schema::{ColumnKind, COMPANY, FEATURE_SCHEMA, FUEL_TYPE, KMS_DRIVEN, NAME, YEAR};
use crate::table::{Column, Table};
use thiserror::Error;

pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 2024;
/// Year used when the field is left blank.
pub const YEAR_DEFAULT: i32 = 2024;
/// Increment offered by the odometer input.
pub const KMS_STEP: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field}: '{value}' is not a number")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Raw, unvalidated form input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarForm {
    pub name: String,
    pub company: String,
    pub year: String,
    pub kms_driven: String,
    pub fuel_type: String,
}

/// A validated prediction request.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionRequest {
    pub name: String,
    pub company: String,
    pub year: i32,
    pub kms_driven: f64,
    pub fuel_type: String,
}

fn required(field: &'static str, raw: &str) -> std::result::Result<String, FormError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(value.to_string())
}

impl CarForm {
    /// Validate the raw input.
    ///
    /// A blank year falls back to [`YEAR_DEFAULT`] and a blank odometer
    /// reading to zero, mirroring the defaults of the numeric inputs.
    pub fn parse(&self) -> std::result::Result<PredictionRequest, FormError> {
        let name = required(NAME, &self.name)?;
        let company = required(COMPANY, &self.company)?;
        let fuel_type = required(FUEL_TYPE, &self.fuel_type)?;

        let year = match self.year.trim() {
            "" => YEAR_DEFAULT,
            raw => raw.parse::<i32>().map_err(|_| FormError::NotNumeric {
                field: YEAR,
                value: raw.to_string(),
            })?,
        };
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(FormError::OutOfRange {
                field: YEAR,
                value: f64::from(year),
                min: f64::from(YEAR_MIN),
                max: f64::from(YEAR_MAX),
            });
        }

        let kms_driven = match self.kms_driven.trim() {
            "" => 0.0,
            raw => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    return Err(FormError::NotNumeric {
                        field: KMS_DRIVEN,
                        value: raw.to_string(),
                    })
                }
            },
        };
        if kms_driven < 0.0 {
            return Err(FormError::OutOfRange {
                field: KMS_DRIVEN,
                value: kms_driven,
                min: 0.0,
                max: f64::INFINITY,
            });
        }

        Ok(PredictionRequest {
            name,
            company,
            year,
            kms_driven,
            fuel_type,
        })
    }
}

impl PredictionRequest {
    /// Assemble the one-row feature table, one column per schema descriptor.
    pub fn to_inference_row(&self) -> std::result::Result<Table, PreprocessingError> {
        let mut row = Table::new();
        for descriptor in FEATURE_SCHEMA.iter() {
            let column = match (descriptor.kind, descriptor.name) {
                (ColumnKind::Numeric, YEAR) => Column::Numeric(vec![f64::from(self.year)]),
                (ColumnKind::Numeric, KMS_DRIVEN) => Column::Numeric(vec![self.kms_driven]),
                (ColumnKind::Categorical, NAME) => Column::categorical([self.name.as_str()]),
                (ColumnKind::Categorical, COMPANY) => Column::categorical([self.company.as_str()]),
                (ColumnKind::Categorical, FUEL_TYPE) => {
                    Column::categorical([self.fuel_type.as_str()])
                }
                _ => return Err(PreprocessingError::MissingColumn(descriptor.name.to_string())),
            };
            row.insert(descriptor.name, column)?;
        }
        Ok(row)
    }
}

/// Choices for the categorical inputs.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FormOptions {
    pub names: Vec<String>,
    pub companies: Vec<String>,
    pub fuel_types: Vec<String>,
}

impl FormOptions {
    /// Read the training vocabulary out of a fitted pipeline.
    pub fn from_pipeline(pipeline: &PricePipeline<Fitted>) -> Self {
        let vocab = |column: &str| {
            pipeline
                .categories(column)
                .map(<[String]>::to_vec)
                .unwrap_or_default()
        };
        Self {
            names: vocab(NAME),
            companies: vocab(COMPANY),
            fuel_types: vocab(FUEL_TYPE),
        }
    }

    /// Options for a categorical field, by column name.
    pub fn for_field(&self, column: &str) -> &[String] {
        match column {
            NAME => &self.names,
            COMPANY => &self.companies,
            FUEL_TYPE => &self.fuel_types,
            _ => &[],
        }
    }
}

/// Validate `form`, assemble its inference row and predict one price.
pub fn submit(pipeline: &PricePipeline<Fitted>, form: &CarForm) -> Result<f64> {
    let row = form.parse()?.to_inference_row()?;
    let prices = pipeline.predict(&row)?;
    prices.first().copied().ok_or_else(|| {
        crate::Error::Preprocessing(PreprocessingError::EmptyData(
            "no prediction for inference row".to_string(),
        ))
    })
}

/// Group the integer part of a rounded amount with commas.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// The sentence shown after a prediction.
pub fn format_price(value: f64) -> String {
    format!("The predicted price is {} INR", format_amount(value))
}
