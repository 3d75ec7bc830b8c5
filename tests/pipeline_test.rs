//! Parquet file → catalog → examples → sweep

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use credit_sweep::config::SweepConfig;
use credit_sweep::model::LinfaTreeTrainer;
use credit_sweep::pipeline::load_examples;
use credit_sweep::schema::{CreditSchema, FeatureKind};
use credit_sweep::source::{Catalog, RecordSource};
use credit_sweep::storage::StorageEngine;
use credit_sweep::sweep::SweepDriver;
use credit_sweep::Error;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

/// Columns of the credit table with values cycling through each field's range
fn credit_batch(rows: usize) -> RecordBatch {
    let schema = CreditSchema::german_credit();
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for (offset, field) in schema.fields().iter().enumerate() {
        let values: Vec<i32> = (0..rows)
            .map(|row| {
                let step = i32::try_from(row + offset).unwrap();
                match field.kind {
                    FeatureKind::Categorical { cardinality } => {
                        1 + step % i32::try_from(cardinality).unwrap()
                    }
                    FeatureKind::Continuous => 18 + step % 60,
                }
            })
            .collect();
        fields.push(Field::new(field.name.as_str(), DataType::Int32, false));
        columns.push(Arc::new(Int32Array::from(values)));
    }

    let labels: Vec<i32> = (0..rows).map(|row| i32::from(row % 3 != 0)).collect();
    fields.push(Field::new("cred", DataType::Int32, false));
    columns.push(Arc::new(Int32Array::from(labels)));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

fn write_parquet(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

fn catalog_from_parquet(dir: &TempDir, rows: usize) -> Catalog {
    let path = dir.path().join("german_credit.parquet");
    write_parquet(&path, &credit_batch(rows));

    let mut catalog = Catalog::new();
    catalog.register("credit", StorageEngine::load_parquet(&path).unwrap());
    catalog
}

#[test]
fn test_parquet_round_trip_into_examples() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog_from_parquet(&dir, 120);
    assert_eq!(catalog.table("credit").unwrap().num_rows(), 120);

    let prepared = load_examples(&catalog, "credit", &CreditSchema::german_credit()).unwrap();
    assert_eq!(prepared.examples.len(), 120);
    assert_eq!(prepared.registry.len(), 15);
    assert!(prepared.examples.iter().all(|e| e.feature_count() == 20));
    assert!(prepared.examples.iter().all(|e| e.label() <= 1));
}

#[test]
fn test_filtered_fetch() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog_from_parquet(&dir, 60);

    let records = catalog
        .fetch("SELECT age, cred FROM credit WHERE cred = 0 LIMIT 5")
        .unwrap();
    assert_eq!(records.len(), 5);
    for record in &records {
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("cred"), Some(0));
    }
}

#[test]
fn test_unknown_table_and_missing_file() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog_from_parquet(&dir, 10);

    assert!(matches!(
        load_examples(&catalog, "loans", &CreditSchema::german_credit()),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        StorageEngine::load_parquet(dir.path().join("missing.parquet")),
        Err(Error::StorageError(_))
    ));
}

#[test]
fn test_sweep_over_parquet_data() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog_from_parquet(&dir, 100);
    let prepared = load_examples(&catalog, "credit", &CreditSchema::german_credit()).unwrap();

    let config = SweepConfig::builder()
        .depth_candidates([2, 3])
        .num_trials(3)
        .seed(42)
        .build()
        .unwrap();
    let report = SweepDriver::new(LinfaTreeTrainer::new(), config)
        .unwrap()
        .run_report(&prepared.examples, &prepared.registry)
        .unwrap();

    assert_eq!(report.table.len(), 6);
    assert!(report
        .table
        .iter()
        .all(|row| row.train_size == 80 && row.validation_size == 20));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"started_at\""));
    assert!(json.contains("\"depth_candidates\""));
}
