//! The feature schema shared by training and inference.
//!
//! Column names and kinds are declared here once. The preprocessing
//! transformer is built from [`FEATURE_SCHEMA`] and the form assembles its
//! inference row from the same descriptors, so the two cannot drift apart.

use crate::preprocessing::PreprocessingError;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// How a column is interpreted by the feature transformer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Standardized with learned mean and scale.
    Numeric,
    /// One-hot encoded against the learned vocabulary.
    Categorical,
}

/// A named, typed column of the feature matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Numeric,
        }
    }

    const fn categorical(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Categorical,
        }
    }
}

/// Model / listing name, e.g. `"Hyundai Santro Xing"`.
pub const NAME: &str = "name";
/// Manufacturer, e.g. `"Hyundai"`.
pub const COMPANY: &str = "company";
/// Registration year.
pub const YEAR: &str = "year";
/// Odometer reading in kilometres.
pub const KMS_DRIVEN: &str = "kms_driven";
/// Fuel type, e.g. `"Petrol"`.
pub const FUEL_TYPE: &str = "fuel_type";
/// Regression target. Never part of the feature matrix.
pub const PRICE: &str = "price";

/// Columns of the feature matrix, in inference-row order.
pub const FEATURE_SCHEMA: [ColumnDescriptor; 5] = [
    ColumnDescriptor::categorical(NAME),
    ColumnDescriptor::categorical(COMPANY),
    ColumnDescriptor::numeric(YEAR),
    ColumnDescriptor::numeric(KMS_DRIVEN),
    ColumnDescriptor::categorical(FUEL_TYPE),
];

/// Names of the numeric feature columns, in schema order.
pub fn numeric_columns() -> Vec<&'static str> {
    columns_of(ColumnKind::Numeric)
}

/// Names of the categorical feature columns, in schema order.
pub fn categorical_columns() -> Vec<&'static str> {
    columns_of(ColumnKind::Categorical)
}

fn columns_of(kind: ColumnKind) -> Vec<&'static str> {
    FEATURE_SCHEMA
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.name)
        .collect()
}

/// Check that `table` carries every feature column with the right kind.
///
/// Extra columns are allowed and ignored.
pub fn validate(table: &Table) -> Result<(), PreprocessingError> {
    for descriptor in FEATURE_SCHEMA.iter() {
        let column = table
            .column(descriptor.name)
            .ok_or_else(|| PreprocessingError::MissingColumn(descriptor.name.to_string()))?;
        if column.kind() != descriptor.kind {
            return Err(PreprocessingError::ColumnType {
                column: descriptor.name.to_string(),
                expected: descriptor.kind,
                got: column.kind(),
            });
        }
    }
    Ok(())
}
