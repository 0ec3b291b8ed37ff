//! Scaling transformers for numeric features.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`StandardScaler`] | Z-score normalization (mean=0, std=1) |
//!
//! # Example
//!
//! ```ignore
//! use carprice::preprocessing::{StandardScaler, Transformer, FittedTransformer};
//!
//! let scaler = StandardScaler::new();
//! let fitted = scaler.fit(&data)?;
//! let scaled = fitted.transform(&new_data)?;
//! ```

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerParams};
