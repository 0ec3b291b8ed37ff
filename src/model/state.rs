/// A marker type indicating that a model or pipeline is **not yet fitted**.
///
/// Used in generic parameters (e.g. `LinearModel<Unfitted>`,
/// `PricePipeline<Unfitted>`) so that prediction and persistence are simply
/// not available until `fit` has produced the `Fitted` counterpart.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unfitted;

/// A marker type indicating that a model or pipeline has been **fitted**.
///
/// A `Fitted` value contains only inference parameters and can be
/// serialized, loaded and used for prediction any number of times.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fitted;
