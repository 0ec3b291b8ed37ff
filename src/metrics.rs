//! Metrics for evaluating the price model on held-out data.

use serde::Serialize;

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Calculate Mean Squared Error (MSE).
    ///
    /// MSE = mean((y_true - y_pred)^2)
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        debug_assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        sum_sq / y_true.len() as f64
    }

    /// Calculate Root Mean Squared Error (RMSE), in the same units as the target.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// Calculate Mean Absolute Error (MAE).
    ///
    /// MAE = mean(|y_true - y_pred|)
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        debug_assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_abs: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).abs())
            .sum();

        sum_abs / y_true.len() as f64
    }

    /// Calculate R² (coefficient of determination).
    ///
    /// R² = 1 - (SS_res / SS_tot)
    ///
    /// Values can be negative if the model is worse than predicting the mean.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        debug_assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - (ss_res / ss_tot)
    }

    /// Calculate all metrics at once.
    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
        RegressionMetrics::new(
            Self::mse(y_true, y_pred),
            Self::mae(y_true, y_pred),
            Self::r_squared(y_true, y_pred),
        )
    }
}

/// Struct to hold all regression metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
}

impl RegressionMetrics {
    pub fn new(mse: f64, mae: f64, r_squared: f64) -> Self {
        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r_squared,
        }
    }
}
