//! carprice CLI
//!
//! Commands:
//! - train: Fit the pipeline on a CSV dataset and persist it
//! - predict: Predict the price of one car
//! - options: List the known model names, manufacturers and fuel types
//! - form: Interactive prediction loop on stdin/stdout

use anyhow::Context;
use carprice::form::{self, CarForm, FormOptions};
use carprice::schema::{COMPANY, FUEL_TYPE, NAME};
use carprice::{PricePipeline, TrainConfig};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "carprice")]
#[command(about = "Used car price prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the pipeline on a CSV dataset and save it
    Train {
        /// Training CSV
        #[arg(short, long, env = "CARPRICE_DATA", default_value = "data/cleaned_car_data.csv")]
        data: PathBuf,
        /// Where to write the fitted pipeline
        #[arg(short, long, env = "CARPRICE_ARTIFACT", default_value = "pipeline.bin")]
        artifact: PathBuf,
        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,
        /// Seed of the train/test shuffle
        #[arg(long, default_value_t = 25)]
        seed: u64,
        /// Print the training report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Predict the price of one car
    Predict {
        #[arg(short, long, env = "CARPRICE_ARTIFACT", default_value = "pipeline.bin")]
        artifact: PathBuf,
        /// Model name
        #[arg(long)]
        name: String,
        /// Manufacturer
        #[arg(long)]
        company: String,
        /// Registration year
        #[arg(long, default_value = "")]
        year: String,
        /// Odometer reading in km
        #[arg(long, default_value = "")]
        kms: String,
        /// Fuel type
        #[arg(long)]
        fuel: String,
    },
    /// List the choices known to the fitted pipeline
    Options {
        #[arg(short, long, env = "CARPRICE_ARTIFACT", default_value = "pipeline.bin")]
        artifact: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive prediction form
    Form {
        #[arg(short, long, env = "CARPRICE_ARTIFACT", default_value = "pipeline.bin")]
        artifact: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            artifact,
            test_size,
            seed,
            json,
        } => {
            let config = TrainConfig::new()
                .with_test_size(test_size)
                .with_random_state(seed);
            let report = carprice::train(&data, &artifact, &config)
                .with_context(|| format!("training on {} failed", data.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "trained on {} rows, held out {}, {} features",
                    report.n_train, report.n_test, report.n_features_out
                );
                if let Some(m) = report.test_metrics {
                    println!(
                        "MAE {} INR, RMSE {} INR, R² {:.4}",
                        form::format_amount(m.mae),
                        form::format_amount(m.rmse),
                        m.r_squared
                    );
                }
                println!("saved to {}", artifact.display());
            }
        }
        Commands::Predict {
            artifact,
            name,
            company,
            year,
            kms,
            fuel,
        } => {
            let pipeline = load(&artifact)?;
            let car = CarForm {
                name,
                company,
                year,
                kms_driven: kms,
                fuel_type: fuel,
            };
            let price = form::submit(&pipeline, &car)?;
            println!("{}", form::format_price(price));
        }
        Commands::Options { artifact, json } => {
            let options = FormOptions::from_pipeline(&load(&artifact)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                let fields = [
                    ("Model names", NAME),
                    ("Manufacturers", COMPANY),
                    ("Fuel types", FUEL_TYPE),
                ];
                for (label, column) in fields {
                    println!("{}: {}", label, options.for_field(column).join(", "));
                }
            }
        }
        Commands::Form { artifact } => {
            let pipeline = load(&artifact)?;
            let stdin = io::stdin();
            run_form(&pipeline, stdin.lock(), io::stdout().lock())?;
        }
    }

    Ok(())
}

fn load(artifact: &Path) -> anyhow::Result<PricePipeline> {
    PricePipeline::load_from_file(artifact)
        .with_context(|| format!("cannot load pipeline from {}", artifact.display()))
}

/// Map a numbered choice to its option; anything else is taken verbatim.
fn resolve_choice(input: &str, options: &[String]) -> String {
    match input.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].clone(),
        _ => input.to_string(),
    }
}

fn prompt<R: BufRead, W: Write>(
    reader: &mut R,
    out: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}: ", label)?;
    out.flush()?;
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_choice<R: BufRead, W: Write>(
    reader: &mut R,
    out: &mut W,
    label: &str,
    options: &[String],
) -> io::Result<Option<String>> {
    for (i, option) in options.iter().enumerate() {
        writeln!(out, "  {:>3}. {}", i + 1, option)?;
    }
    let Some(input) = prompt(reader, out, label)? else {
        return Ok(None);
    };
    let choice = resolve_choice(&input, options);
    if !choice.is_empty() && !options.contains(&choice) {
        warn!("'{}' is not a known {}", choice, label.to_lowercase());
    }
    Ok(Some(choice))
}

/// One prediction per submitted form until input ends or the name is blank.
/// Invalid input is reported and the loop continues.
fn run_form<R: BufRead, W: Write>(
    pipeline: &PricePipeline,
    mut reader: R,
    mut out: W,
) -> io::Result<()> {
    let options = FormOptions::from_pipeline(pipeline);
    writeln!(out, "Used Car Price Prediction (leave the model name blank to quit)")?;

    loop {
        let Some(name) = prompt_choice(&mut reader, &mut out, "Model name", &options.names)? else {
            break;
        };
        if name.is_empty() {
            break;
        }
        let Some(company) =
            prompt_choice(&mut reader, &mut out, "Manufacturer", &options.companies)?
        else {
            break;
        };
        let Some(year) = prompt(
            &mut reader,
            &mut out,
            &format!(
                "Model year [{}-{}, default {}]",
                form::YEAR_MIN,
                form::YEAR_MAX,
                form::YEAR_DEFAULT
            ),
        )?
        else {
            break;
        };
        let Some(kms_driven) = prompt(
            &mut reader,
            &mut out,
            &format!("Odometer reading in kms [>= 0, step {}]", form::KMS_STEP),
        )?
        else {
            break;
        };
        let Some(fuel_type) =
            prompt_choice(&mut reader, &mut out, "Fuel type", &options.fuel_types)?
        else {
            break;
        };

        let car = CarForm {
            name,
            company,
            year,
            kms_driven,
            fuel_type,
        };
        match form::submit(pipeline, &car) {
            Ok(price) => writeln!(out, "{}", form::format_price(price))?,
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }

    info!("form closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_predict_parses() {
        let cli = Cli::parse_from([
            "carprice", "predict", "--artifact", "p.bin", "--name", "City", "--company", "Honda",
            "--year", "2015", "--kms", "40000", "--fuel", "Petrol",
        ]);
        if let Commands::Predict { name, year, kms, .. } = cli.command {
            assert_eq!(name, "City");
            assert_eq!(year, "2015");
            assert_eq!(kms, "40000");
        } else {
            panic!("Expected Predict command");
        }
    }

    #[test]
    fn test_cli_train_defaults() {
        let cli = Cli::parse_from([
            "carprice",
            "train",
            "--data",
            "cars.csv",
            "--artifact",
            "p.bin",
        ]);
        if let Commands::Train { test_size, seed, json, .. } = cli.command {
            assert_eq!(test_size, 0.2);
            assert_eq!(seed, 25);
            assert!(!json);
        } else {
            panic!("Expected Train command");
        }
    }

    fn fitted_pipeline() -> PricePipeline {
        use carprice::{Column, Table};
        let table = Table::new()
            .with_column("name", Column::categorical(["City", "Swift", "City", "Nano"]))
            .unwrap()
            .with_column("company", Column::categorical(["Honda", "Maruti", "Honda", "Tata"]))
            .unwrap()
            .with_column("year", Column::Numeric(vec![2015.0, 2012.0, 2018.0, 2013.0]))
            .unwrap()
            .with_column("kms_driven", Column::Numeric(vec![40000.0, 60000.0, 20000.0, 30000.0]))
            .unwrap()
            .with_column("fuel_type", Column::categorical(["Petrol", "Petrol", "Diesel", "Petrol"]))
            .unwrap();
        PricePipeline::new()
            .fit(&table, &[550000.0, 300000.0, 750000.0, 90000.0])
            .unwrap()
    }

    #[test]
    fn test_form_loop_recovers_from_bad_input() {
        let pipeline = fitted_pipeline();
        let input = "City\nHonda\n2015\n40000\nPetrol\n\
                     1\n1\n1800\n40000\n2\n\
                     \n";
        let mut out = Vec::new();
        run_form(&pipeline, input.as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("The predicted price is").count(), 1);
        assert!(text.contains("Odometer reading in kms [>= 0, step 100]"));
        assert!(text.contains("error: Invalid input: year must be between 1900 and 2024"));
    }

    #[test]
    fn test_form_loop_stops_at_end_of_input() {
        let pipeline = fitted_pipeline();
        let mut out = Vec::new();
        run_form(&pipeline, "City\nHonda\n".as_bytes(), &mut out).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("predicted"));
    }

    #[test]
    fn test_resolve_choice() {
        let options = vec!["Diesel".to_string(), "Petrol".to_string()];
        assert_eq!(resolve_choice("2", &options), "Petrol");
        assert_eq!(resolve_choice("3", &options), "3");
        assert_eq!(resolve_choice("LPG", &options), "LPG");
    }
}
