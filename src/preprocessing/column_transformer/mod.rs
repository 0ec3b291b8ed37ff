//! ColumnTransformer for applying different transformers to different columns.
//!
//! This module provides the `ColumnTransformer` which allows applying different
//! preprocessing steps to different named columns of a table.

#[allow(clippy::module_inception)]
mod column_transformer;

pub use column_transformer::{
    scale_and_encode, ColumnTransformer, ColumnTransformerParams, ColumnTransformerStep,
    FittedColumnTransformer, FittedColumnTransformerStep, StepParams,
};
