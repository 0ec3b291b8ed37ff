//! Used-car price prediction.
//!
//! A [`ColumnTransformer`](preprocessing::ColumnTransformer) standardizes
//! `year` and `kms_driven` and one-hot encodes `name`, `company` and
//! `fuel_type`; an ordinary least squares [`LinearRegression`] maps the
//! result to a price. The two are composed into a [`PricePipeline`] that is
//! fitted once by [`training::train`], persisted, loaded and queried through
//! the [`form`] surface.

pub mod dataset;
pub mod error;
pub mod form;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod serialization;
pub mod table;
pub mod training;

pub use error::{Error, Result};
pub use form::{format_price, CarForm, FormOptions, PredictionRequest};
pub use model::{Fitted, LinearRegression, Unfitted};
pub use pipeline::PricePipeline;
pub use table::{Column, Table};
pub use training::{train, TrainConfig, TrainingReport};
