//! Queryable record sources
//!
//! [`RecordSource`] is the read side the pipeline depends on: run a query,
//! get raw records back. [`Catalog`] implements it over named in-memory
//! tables using the SQL subset in [`crate::query`].

use arrow::array::{Array, Int64Array, RecordBatch};
use arrow::compute;
use arrow::datatypes::DataType;
use rustc_hash::FxHashMap;

use crate::query::{QueryEngine, QueryExecutor};
use crate::record::RawRecord;
use crate::storage::StorageEngine;
use crate::{Error, Result};

/// Anything that can answer a query with raw records
pub trait RecordSource {
    /// Run `sql` and return one raw record per result row
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be parsed or executed, or if the
    /// result has columns that are not integers.
    fn fetch(&self, sql: &str) -> Result<Vec<RawRecord>>;
}

/// Named tables queryable with SQL
#[derive(Debug, Default)]
pub struct Catalog {
    tables: FxHashMap<String, StorageEngine>,
    engine: QueryEngine,
    executor: QueryExecutor,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a table
    pub fn register(&mut self, name: impl Into<String>, storage: StorageEngine) {
        let name = name.into();
        tracing::debug!(table = %name, rows = storage.num_rows(), "Registered table");
        self.tables.insert(name, storage);
    }

    /// Look up a table
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&StorageEngine> {
        self.tables.get(name)
    }

    /// Names of registered tables, sorted
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run a query and return the Arrow result
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for unsupported SQL and `InvalidInput` for an
    /// unknown table or column.
    pub fn query(&self, sql: &str) -> Result<RecordBatch> {
        let plan = self.engine.parse(sql)?;
        let storage = self
            .tables
            .get(&plan.table)
            .ok_or_else(|| Error::InvalidInput(format!("Table not found: {}", plan.table)))?;
        self.executor.execute(&plan, storage)
    }
}

impl RecordSource for Catalog {
    fn fetch(&self, sql: &str) -> Result<Vec<RawRecord>> {
        let batch = self.query(sql)?;
        let records = raw_records(&batch)?;
        tracing::info!(rows = records.len(), "Fetched raw records");
        Ok(records)
    }
}

/// Convert every row of `batch` into a raw record
///
/// Integer columns of any width are widened to `i64`; null cells are left
/// out of the record.
///
/// # Errors
///
/// Returns `SchemaError` if a column is not an integer type.
pub fn raw_records(batch: &RecordBatch) -> Result<Vec<RawRecord>> {
    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        if !column.data_type().is_integer() {
            return Err(Error::SchemaError(format!(
                "Column '{}' has type {}, expected an integer type",
                field.name(),
                column.data_type()
            )));
        }
        let widened = compute::cast(column, &DataType::Int64)?;
        columns.push((field.name().as_str(), widened));
    }

    let mut typed = Vec::with_capacity(columns.len());
    for (name, array) in &columns {
        let values = array
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| Error::StorageError("Failed to downcast to Int64Array".to_string()))?;
        typed.push((*name, values));
    }

    Ok((0..batch.num_rows())
        .map(|row| {
            typed
                .iter()
                .filter(|(_, values)| !values.is_null(row))
                .map(|(name, values)| (*name, values.value(row)))
                .collect()
        })
        .collect())
}
