//! Credit-scoring depth sweep
//!
//! Loads the credit table from a Parquet file (or generates a synthetic one
//! when no path is given), runs the depth sweep, and prints the per-depth
//! summary followed by the full report as JSON.
//!
//! Run with:
//!   cargo run --example credit_sweep --release -- [data.parquet] [config.json]
//!
//! Set `RUST_LOG=credit_sweep=debug` to log every fit.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use credit_sweep::config::SweepConfig;
use credit_sweep::model::LinfaTreeTrainer;
use credit_sweep::pipeline::load_examples;
use credit_sweep::schema::{CreditSchema, FeatureKind};
use credit_sweep::source::Catalog;
use credit_sweep::storage::StorageEngine;
use credit_sweep::sweep::SweepDriver;
use credit_sweep::telemetry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<()> {
    telemetry::init("credit_sweep=info");

    let mut args = std::env::args().skip(1);
    let data_path = args.next();
    let config = match args.next() {
        Some(path) => SweepConfig::from_path(&path)
            .with_context(|| format!("loading sweep config from {path}"))?,
        None => SweepConfig::default(),
    };

    let schema = CreditSchema::german_credit();
    let storage = match &data_path {
        Some(path) => StorageEngine::load_parquet(path)
            .with_context(|| format!("loading credit table from {path}"))?,
        None => StorageEngine::new(vec![synthetic_table(&schema, 1_000)?]),
    };

    let mut catalog = Catalog::new();
    catalog.register("credit", storage);

    let data = load_examples(&catalog, "credit", &schema).context("preparing examples")?;
    println!(
        "Loaded {} examples with {} features ({} categorical)",
        data.examples.len(),
        data.examples.first().map_or(0, |e| e.feature_count()),
        data.registry.len()
    );

    let driver = SweepDriver::new(LinfaTreeTrainer::new(), config)?;
    let start = Instant::now();
    #[cfg(feature = "parallel")]
    let table = driver.run_parallel(&data.examples, &data.registry)?;
    #[cfg(not(feature = "parallel"))]
    let table = driver.run(&data.examples, &data.registry)?;
    let elapsed = start.elapsed();

    println!("\nSweep: {} fits in {elapsed:?}", table.len());
    println!(
        "{:>9} {:>6} {:>12} {:>12} {:>10} {:>10}",
        "max_depth", "runs", "train_err", "valid_err", "depth", "nodes"
    );
    for s in table.summarize() {
        println!(
            "{:>9} {:>6} {:>6.3}±{:<5.3} {:>6.3}±{:<5.3} {:>10.2} {:>10.1}",
            s.max_depth,
            s.runs,
            s.mean_train_error,
            s.std_train_error,
            s.mean_validation_error,
            s.std_validation_error,
            s.mean_depth,
            s.mean_node_count
        );
    }
    if let Some(best) = table.best_depth() {
        println!("\nLowest mean validation error at max_depth = {best}");
    }

    println!("\n{}", table.to_json_lines()?);
    Ok(())
}

/// Applicants whose creditworthiness depends on balance, duration and age,
/// with 15% label noise
fn synthetic_table(schema: &CreditSchema, rows: usize) -> Result<RecordBatch> {
    let mut rng = StdRng::seed_from_u64(1994);
    let mut fields = Vec::new();
    let mut columns: Vec<Vec<i64>> = Vec::new();

    for field in schema.fields() {
        let values = (0..rows)
            .map(|_| match (field.name.as_str(), field.kind) {
                (_, FeatureKind::Categorical { cardinality }) => {
                    rng.gen_range(1..=i64::from(cardinality))
                }
                ("dur_cred", _) => rng.gen_range(4..=72),
                ("cred_amt", _) => rng.gen_range(250..=18_424),
                ("age", _) => rng.gen_range(19..=75),
                _ => rng.gen_range(1..=4),
            })
            .collect();
        fields.push(Field::new(field.name.as_str(), DataType::Int64, false));
        columns.push(values);
    }

    let column = |name: &str| -> Result<&Vec<i64>> {
        let index = schema
            .fields()
            .iter()
            .position(|f| f.name == name)
            .with_context(|| format!("schema has no {name} column"))?;
        Ok(&columns[index])
    };
    let (balance, duration, age) = (column("acct_bal")?, column("dur_cred")?, column("age")?);

    let labels: Vec<i64> = (0..rows)
        .map(|i| {
            let good = balance[i] >= 3 || (duration[i] <= 24 && age[i] >= 25);
            i64::from(good != rng.gen_bool(0.15))
        })
        .collect();

    fields.push(Field::new(schema.label(), DataType::Int64, false));
    let mut arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|values| Arc::new(Int64Array::from(values.clone())) as ArrayRef)
        .collect();
    arrays.push(Arc::new(Int64Array::from(labels)));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
