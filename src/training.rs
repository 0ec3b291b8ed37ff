//! Training: load the dataset, split, fit, evaluate and persist.

use crate::dataset::CarDataset;
use crate::error::Result;
use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::Fitted;
use crate::pipeline::PricePipeline;
use log::info;
use serde::Serialize;
use std::path::Path;

/// Hyperparameters of a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainConfig {
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Seed of the shuffle before splitting.
    pub random_state: u64,
    pub fit_intercept: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 25,
            fit_intercept: true,
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }
}

/// Summary of a training run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingReport {
    pub n_train: usize,
    pub n_test: usize,
    pub n_features_out: usize,
    /// Held-out metrics; `None` when the test split is empty.
    pub test_metrics: Option<RegressionMetrics>,
}

/// Fit a pipeline on the training split of `dataset` and evaluate it on the
/// held-out split.
pub fn fit_and_evaluate(
    dataset: &CarDataset,
    config: &TrainConfig,
) -> Result<(PricePipeline<Fitted>, TrainingReport)> {
    let (train, test) = dataset.split(config.test_size, config.random_state);
    info!(
        "split {} rows into {} train / {} test (seed {})",
        dataset.len(),
        train.len(),
        test.len(),
        config.random_state
    );

    let pipeline = PricePipeline::new()
        .with_fit_intercept(config.fit_intercept)
        .fit(train.features(), train.target())?;

    let test_metrics = if test.is_empty() {
        None
    } else {
        let predictions = pipeline.predict(test.features())?;
        let metrics = Metrics::calculate_all(test.target(), &predictions.to_vec());
        info!(
            "held-out MAE {:.0}, RMSE {:.0}, R² {:.4}",
            metrics.mae, metrics.rmse, metrics.r_squared
        );
        Some(metrics)
    };

    let report = TrainingReport {
        n_train: train.len(),
        n_test: test.len(),
        n_features_out: pipeline.model().n_features(),
        test_metrics,
    };
    Ok((pipeline, report))
}

/// Load the CSV at `dataset_path`, train, and write the fitted pipeline to
/// `artifact_path`.
pub fn train<P: AsRef<Path>, Q: AsRef<Path>>(
    dataset_path: P,
    artifact_path: Q,
    config: &TrainConfig,
) -> Result<TrainingReport> {
    let dataset = CarDataset::load(dataset_path)?;
    let (pipeline, report) = fit_and_evaluate(&dataset, config)?;
    pipeline.save_to_file(artifact_path)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const CSV: &str = "\
name,company,year,price,kms_driven,fuel_type
Honda City,Honda,2015,575000,36000,Petrol
Honda City,Honda,2012,390000,60000,Petrol
Honda Amaze,Honda,2016,480000,30000,Diesel
Maruti Suzuki Swift,Maruti,2012,325000,41000,Petrol
Maruti Suzuki Swift,Maruti,2017,520000,15000,Petrol
Maruti Suzuki Alto,Maruti,2010,150000,70000,Petrol
Tata Indica V2,Tata,2011,110000,60000,Diesel
Tata Nano,Tata,2013,90000,30000,Petrol
Hyundai i20,Hyundai,2014,400000,45000,Petrol
Hyundai i20,Hyundai,2018,620000,12000,Diesel
";

    #[test]
    fn test_default_config() {
        let config = TrainConfig::new();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 25);
        assert!(config.fit_intercept);
    }

    #[test]
    fn test_train_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cars.csv");
        let artifact = dir.path().join("pipeline.bin");
        std::fs::write(&data, CSV).unwrap();

        let report = train(&data, &artifact, &TrainConfig::new()).unwrap();
        assert_eq!(report.n_train, 8);
        assert_eq!(report.n_test, 2);
        assert!(report.test_metrics.is_some());
        assert!(artifact.exists());

        let loaded = PricePipeline::load_from_file(&artifact).unwrap();
        assert_eq!(loaded.model().n_features(), report.n_features_out);

        // Metrics are scored on the held-out rows of the seeded split
        let dataset = CarDataset::from_reader(CSV.as_bytes()).unwrap();
        let (_, test) = dataset.split(0.2, 25);
        let predictions = loaded.predict(test.features()).unwrap().to_vec();
        let expected_mae = Metrics::mae(test.target(), &predictions);
        let expected_mse = Metrics::mse(test.target(), &predictions);

        let metrics = report.test_metrics.unwrap();
        assert!((metrics.mae - expected_mae).abs() <= 1e-6 * expected_mae.max(1.0));
        assert!((metrics.mse - expected_mse).abs() <= 1e-6 * expected_mse.max(1.0));
        let expected_rmse = expected_mse.sqrt();
        assert!((metrics.rmse - expected_rmse).abs() <= 1e-6 * expected_rmse.max(1.0));
    }

    #[test]
    fn test_metrics_differ_from_training_fit() {
        let dataset = CarDataset::from_reader(CSV.as_bytes()).unwrap();
        let (pipeline, report) = fit_and_evaluate(&dataset, &TrainConfig::new()).unwrap();
        let (train, _) = dataset.split(0.2, 25);

        let train_predictions = pipeline.predict(train.features()).unwrap().to_vec();
        let train_mae = Metrics::mae(train.target(), &train_predictions);
        let test_mae = report.test_metrics.unwrap().mae;
        assert!((test_mae - train_mae).abs() > 1.0);
    }

    #[test]
    fn test_zero_test_size_skips_evaluation() {
        let dataset = CarDataset::from_reader(CSV.as_bytes()).unwrap();
        let (_, report) =
            fit_and_evaluate(&dataset, &TrainConfig::new().with_test_size(0.0)).unwrap();
        assert_eq!(report.n_train, 10);
        assert_eq!(report.test_metrics, None);
    }

    #[test]
    fn test_train_aborts_on_bad_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cars.csv");
        let artifact = dir.path().join("pipeline.bin");
        std::fs::write(
            &data,
            "name,company,year,price,kms_driven,fuel_type\nCity,Honda,2015,Ask,1,Petrol\n",
        )
        .unwrap();

        assert!(matches!(
            train(&data, &artifact, &TrainConfig::new()),
            Err(Error::Dataset(_))
        ));
        assert!(!artifact.exists());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = TrainingReport {
            n_train: 8,
            n_test: 2,
            n_features_out: 12,
            test_metrics: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["n_train"], 8);
        assert!(json["test_metrics"].is_null());
    }
}
