//! Storage backend (Arrow/Parquet)
//!
//! Tables are held as a list of Arrow record batches that all share one
//! schema. Writes are append-only: a dataset is loaded once (Parquet file or
//! in-memory batches) and then only read by the query executor.

use crate::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::path::Path;

/// Storage engine for Arrow/Parquet data
#[derive(Debug, Clone, Default)]
pub struct StorageEngine {
    batches: Vec<RecordBatch>,
}

impl StorageEngine {
    /// Create a new storage engine from existing batches
    ///
    /// Useful for testing and for data produced in memory
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Load table from Parquet file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use std::fs::File;

        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::StorageError(format!("Failed to open Parquet file: {e}")))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| Error::StorageError(format!("Failed to parse Parquet file: {e}")))?;

        let reader = builder
            .build()
            .map_err(|e| Error::StorageError(format!("Failed to build Parquet reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch
                .map_err(|e| Error::StorageError(format!("Failed to read record batch: {e}")))?;
            batches.push(batch);
        }

        tracing::debug!(
            path = %path.display(),
            batches = batches.len(),
            "Loaded Parquet table"
        );

        Ok(Self { batches })
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Schema shared by every batch, if any batch is loaded
    #[must_use]
    pub fn schema(&self) -> Option<SchemaRef> {
        self.batches.first().map(RecordBatch::schema)
    }

    /// Total row count across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Check if the table holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Append a batch to the table
    ///
    /// This is the only write operation; rows are never updated in place.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use credit_sweep::storage::StorageEngine;
    /// # use arrow::array::{Int64Array, RecordBatch};
    /// # use arrow::datatypes::{DataType, Field, Schema};
    /// # use std::sync::Arc;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let schema = Arc::new(Schema::new(vec![
    ///     Field::new("age", DataType::Int64, false),
    /// ]));
    /// let batch = RecordBatch::try_new(
    ///     schema,
    ///     vec![Arc::new(Int64Array::from(vec![67, 22, 49]))],
    /// )?;
    ///
    /// let mut storage = StorageEngine::new(vec![]);
    /// storage.append_batch(batch)?;
    /// assert_eq!(storage.num_rows(), 3);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns error if batch schema doesn't match existing batches
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if let Some(existing_schema) = self.schema() {
            if batch.schema() != existing_schema {
                return Err(Error::StorageError(format!(
                    "Schema mismatch: expected {:?}, got {:?}",
                    existing_schema,
                    batch.schema()
                )));
            }
        }

        self.batches.push(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    #[allow(clippy::cast_possible_wrap)]
    fn create_test_batch(num_rows: usize) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("age", DataType::Int64, false),
            Field::new("cred", DataType::Int64, false),
        ]);

        let age = Int64Array::from_iter_values((0..num_rows).map(|i| 20 + i as i64));
        let cred = Int64Array::from_iter_values((0..num_rows).map(|i| (i % 2) as i64));

        RecordBatch::try_new(Arc::new(schema), vec![Arc::new(age), Arc::new(cred)]).unwrap()
    }

    #[test]
    fn test_append_batch_accumulates_rows() {
        let mut storage = StorageEngine::new(vec![]);
        storage.append_batch(create_test_batch(100)).unwrap();
        storage.append_batch(create_test_batch(200)).unwrap();

        assert_eq!(storage.batches().len(), 2);
        assert_eq!(storage.num_rows(), 300);
        assert!(!storage.is_empty());
    }

    #[test]
    fn test_append_batch_schema_validation() {
        let mut storage = StorageEngine::new(vec![]);
        storage.append_batch(create_test_batch(10)).unwrap();

        let incompatible_schema =
            Schema::new(vec![Field::new("different_field", DataType::Int32, false)]);
        let incompatible_batch = RecordBatch::try_new(
            Arc::new(incompatible_schema),
            vec![Arc::new(Int32Array::from(vec![1, 2, 3]))],
        )
        .unwrap();

        let result = storage.append_batch(incompatible_batch);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Schema mismatch"));
    }

    #[test]
    fn test_empty_storage() {
        let storage = StorageEngine::default();
        assert!(storage.is_empty());
        assert!(storage.schema().is_none());
    }

    #[test]
    fn test_load_parquet_missing_file() {
        let result = StorageEngine::load_parquet("/nonexistent/credit.parquet");
        assert!(matches!(result, Err(Error::StorageError(_))));
    }
}
