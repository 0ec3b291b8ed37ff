//! Categorical feature encoding transformers.
//!
//! ## OneHotEncoder
//! Converts categorical string values to one-hot (dummy) encoding.
//!
//! ```ignore
//! // Input:  [["Diesel"], ["Petrol"]]  (2 samples, 1 categorical feature)
//! // Output: [[1, 0], [0, 1]]          (2 samples, 2 binary features)
//! ```

mod one_hot;

pub use one_hot::{CategoricalColumns, FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};

/// Strategy for handling unknown categories during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    #[default]
    Error,
    /// Ignore unknown categories (all-zero indicator block).
    Ignore,
}
