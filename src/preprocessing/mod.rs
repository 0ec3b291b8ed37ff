//! Data preprocessing transformers for the price pipeline.
//!
//! Transformers follow the same fitted/unfitted split as the models in this
//! crate: an unfitted transformer holds hyperparameters, `fit` returns a
//! separate fitted type that only transforms.
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Available Transformers
//!
//! ## Scaling
//! - [`StandardScaler`]: Z-score normalization
//!
//! ## Encoding
//! - [`OneHotEncoder`]: Indicator columns for string categories
//!
//! ## Composition
//! - [`ColumnTransformer`]: Route named table columns to different transformers
//!
//! # Example
//!
//! ```ignore
//! use carprice::preprocessing::{scale_and_encode, FittedTransformer, Transformer};
//!
//! let fitted = scale_and_encode(["year", "kms_driven"], ["name", "company", "fuel_type"])
//!     .fit(&training_table)?;
//!
//! fitted.save_to_file("transformer.bin")?;
//! let loaded = FittedColumnTransformer::load_from_file("transformer.bin")?;
//! let features = loaded.transform(&inference_row)?;
//! ```

pub mod column_transformer;
pub mod encoding;
pub mod error;
pub mod scaling;
pub mod traits;

pub use column_transformer::{
    scale_and_encode, ColumnTransformer, ColumnTransformerParams, ColumnTransformerStep,
    FittedColumnTransformer, StepParams,
};
pub use encoding::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams};
pub use error::PreprocessingError;
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
