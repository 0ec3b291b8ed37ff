//! Fit, persist, load and predict through the public API.

use carprice::dataset::CarDataset;
use carprice::form::{self, CarForm, FormOptions};
use carprice::pipeline::PricePipeline;
use carprice::{Column, Error, Table, TrainConfig};
use std::path::Path;

const CARS: &str = "\
,name,company,year,price,kms_driven,fuel_type
0,Hyundai Santro Xing,Hyundai,2007,80000,45000,Petrol
1,Mahindra Jeep CL550,Mahindra,2006,425000,40,Diesel
2,Hyundai Grand i10,Hyundai,2014,325000,28000,Petrol
3,Ford EcoSport Titanium,Ford,2014,575000,36000,Diesel
4,Ford Figo,Ford,2012,175000,41000,Diesel
5,Hyundai Eon,Hyundai,2013,190000,25000,Petrol
6,Ford EcoSport Ambiente,Ford,2016,830000,24530,Diesel
7,Maruti Suzuki Alto,Maruti,2015,250000,60000,Petrol
8,Skoda Fabia Classic,Skoda,2010,182000,60000,Petrol
9,Maruti Suzuki Stingray,Maruti,2015,315000,30000,Petrol
10,Hyundai Elite i20,Hyundai,2014,415000,32000,Petrol
11,Mahindra Scorpio SLE,Mahindra,2012,320000,48660,Diesel
12,City,Honda,2015,575000,40000,Petrol
13,City,Honda,2012,380000,70000,Petrol
14,Amaze,Honda,2016,450000,30000,Diesel
15,Maruti Suzuki Swift,Maruti,2012,300000,50000,Petrol
16,Tata Indica V2,Tata,2009,110000,80000,Diesel
17,Tata Nano,Tata,2013,75000,20000,Petrol
18,Mahindra XUV500,Mahindra,2017,1200000,30000,Diesel
19,Maruti Suzuki Wagon R,Maruti,2018,350000,10000,Petrol
";

fn write_dataset(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("cars.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

fn car(name: &str, company: &str, year: &str, kms: &str, fuel: &str) -> CarForm {
    CarForm {
        name: name.to_string(),
        company: company.to_string(),
        year: year.to_string(),
        kms_driven: kms.to_string(),
        fuel_type: fuel.to_string(),
    }
}

fn fitted_on_everything() -> PricePipeline {
    let dataset = CarDataset::from_reader(CARS.as_bytes()).unwrap();
    PricePipeline::new()
        .fit(dataset.features(), dataset.target())
        .unwrap()
}

fn rows(n: usize) -> Table {
    let dataset = CarDataset::from_reader(CARS.as_bytes()).unwrap();
    dataset.features().take_rows(&(0..n).collect::<Vec<_>>())
}

#[test]
fn end_to_end_train_persist_load_predict() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), CARS);
    let artifact = dir.path().join("pipeline.bin");

    carprice::train(&data, &artifact, &TrainConfig::new()).unwrap();
    let pipeline = PricePipeline::load_from_file(&artifact).unwrap();

    let price = form::submit(&pipeline, &car("City", "Honda", "2015", "40000", "Petrol")).unwrap();
    assert!(price.is_finite());
    assert!(form::format_price(price).starts_with("The predicted price is "));
    assert!(form::format_price(price).ends_with(" INR"));
}

#[test]
fn repeated_predictions_are_identical() {
    let pipeline = fitted_on_everything();
    let row = car("City", "Honda", "2015", "40000", "Petrol");

    let first = form::submit(&pipeline, &row).unwrap();
    for _ in 0..10 {
        assert_eq!(form::submit(&pipeline, &row).unwrap().to_bits(), first.to_bits());
    }
}

#[test]
fn one_prediction_per_row_in_order() {
    let pipeline = fitted_on_everything();
    let table = rows(7);

    let batch = pipeline.predict(&table).unwrap();
    assert_eq!(batch.len(), 7);

    for i in 0..7 {
        let single = pipeline.predict(&table.take_rows(&[i])).unwrap();
        assert!((single[0] - batch[i]).abs() < 1e-6);
    }
}

#[test]
fn unseen_categories_still_predict() {
    let pipeline = fitted_on_everything();
    let price = form::submit(
        &pipeline,
        &car("Tesla Model 3", "Tesla", "2020", "5000", "Electric"),
    )
    .unwrap();
    assert!(price.is_finite());
}

#[test]
fn save_and_load_gives_identical_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("pipeline.bin");
    let pipeline = fitted_on_everything();
    pipeline.save_to_file(&artifact).unwrap();
    let loaded = PricePipeline::load_from_file(&artifact).unwrap();

    let table = rows(20);
    let before = pipeline.predict(&table).unwrap();
    let after = loaded.predict(&table).unwrap();
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(
        FormOptions::from_pipeline(&pipeline),
        FormOptions::from_pipeline(&loaded)
    );
}

#[test]
fn negative_predictions_are_not_clamped() {
    // price = 100000 + 50000 * (year - 2010) - 2 * kms + 50000 * diesel
    let linear = "\
name,company,year,price,kms_driven,fuel_type
City,Honda,2015,270000,40000,Petrol
City,Honda,2012,60000,70000,Petrol
City,Honda,2018,510000,20000,Diesel
Swift,Maruti,2013,190000,30000,Petrol
Swift,Maruti,2016,350000,50000,Diesel
Swift,Maruti,2011,30000,60000,Petrol
Nano,Tata,2014,260000,20000,Petrol
Nano,Tata,2017,430000,10000,Petrol
";
    let dataset = CarDataset::from_reader(linear.as_bytes()).unwrap();
    let pipeline = PricePipeline::new()
        .fit(dataset.features(), dataset.target())
        .unwrap();

    let price = form::submit(&pipeline, &car("Nano", "Tata", "1900", "5000000", "Petrol")).unwrap();
    let expected = 100000.0 + 50000.0 * (1900.0 - 2010.0) - 2.0 * 5_000_000.0;
    assert!((price - expected).abs() < 1e-3 * expected.abs());
    assert!(price < 0.0);
    assert!(form::format_price(price).starts_with("The predicted price is -"));
}

#[test]
fn missing_column_in_training_csv_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let without_company: String = CARS
        .lines()
        .map(|line| {
            let mut fields: Vec<&str> = line.split(',').collect();
            fields.remove(2);
            fields.join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    let data = write_dataset(dir.path(), &without_company);
    let artifact = dir.path().join("pipeline.bin");

    let result = carprice::train(&data, &artifact, &TrainConfig::new());
    assert!(matches!(result, Err(Error::Dataset(_))));
    assert!(!artifact.exists());
}

#[test]
fn non_numeric_price_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(
        dir.path(),
        &CARS.replace("2014,575000,36000", "2014,Ask For Price,36000"),
    );
    let artifact = dir.path().join("pipeline.bin");

    assert!(matches!(
        carprice::train(&data, &artifact, &TrainConfig::new()),
        Err(Error::Dataset(_))
    ));
}

#[test]
fn corrupt_artifact_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("pipeline.bin");

    std::fs::write(&artifact, b"definitely not a pipeline").unwrap();
    assert!(matches!(
        PricePipeline::load_from_file(&artifact),
        Err(Error::Artifact(_))
    ));

    // Truncated but otherwise valid artifact
    fitted_on_everything().save_to_file(&artifact).unwrap();
    let bytes = std::fs::read(&artifact).unwrap();
    std::fs::write(&artifact, &bytes[..bytes.len() / 2]).unwrap();
    assert!(PricePipeline::load_from_file(&artifact).is_err());
}

#[test]
fn missing_inference_column_fails_only_that_request() {
    let pipeline = fitted_on_everything();

    let mut table = rows(1);
    table.remove("fuel_type");
    assert!(matches!(pipeline.predict(&table), Err(Error::Preprocessing(_))));

    // The pipeline is untouched and keeps serving
    assert!(pipeline.predict(&rows(1)).is_ok());
}

#[test]
fn year_is_numeric_at_inference() {
    let pipeline = fitted_on_everything();
    let table = rows(1)
        .with_column("year", Column::categorical(["2015"]))
        .unwrap();
    assert!(pipeline.predict(&table).is_err());
}

#[test]
fn fits_at_full_dataset_width() {
    // ~800 listings, 250 model names over 25 makers: close to the width of the real data
    let n = 816;
    let mut names = Vec::with_capacity(n);
    let mut companies = Vec::with_capacity(n);
    let mut years = Vec::with_capacity(n);
    let mut kms = Vec::with_capacity(n);
    let mut fuels = Vec::with_capacity(n);
    let mut prices = Vec::with_capacity(n);

    for i in 0..n {
        let model = i % 250;
        let year = 2005.0 + ((i * 7) % 15) as f64;
        let km = 5_000.0 + ((i * 7919) % 120_000) as f64;
        let diesel = (i / 3) % 2 == 0;

        names.push(format!("Model {}", model));
        companies.push(format!("Maker {}", model % 25));
        years.push(year);
        kms.push(km);
        fuels.push(if diesel { "Diesel" } else { "Petrol" }.to_string());
        prices.push(
            150_000.0 + 20_000.0 * (year - 2005.0) - 1.5 * km
                + 1_000.0 * model as f64
                + if diesel { 40_000.0 } else { 0.0 },
        );
    }

    let table = Table::new()
        .with_column("name", Column::Categorical(names))
        .and_then(|t| t.with_column("company", Column::Categorical(companies)))
        .and_then(|t| t.with_column("year", Column::Numeric(years)))
        .and_then(|t| t.with_column("kms_driven", Column::Numeric(kms)))
        .and_then(|t| t.with_column("fuel_type", Column::Categorical(fuels)))
        .unwrap();

    let pipeline = PricePipeline::new().fit(&table, &prices).unwrap();
    // 2 numeric + 250 names + 25 makers + 2 fuels
    assert_eq!(pipeline.model().n_features(), 279);

    let predictions = pipeline.predict(&table).unwrap();
    for (predicted, actual) in predictions.iter().zip(&prices) {
        assert!((predicted - actual).abs() < 1.0, "{} vs {}", predicted, actual);
    }
}
