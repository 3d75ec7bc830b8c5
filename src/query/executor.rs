//! Query execution engine
//!
//! Executes parsed SQL plans against Arrow storage: WHERE filter, column
//! projection, then LIMIT.

use super::{Predicate, QueryPlan};
use crate::storage::StorageEngine;
use crate::{Error, Result};
use arrow::array::{Array, BooleanArray, Float64Array, RecordBatch};
use arrow::compute;
use arrow::datatypes::{DataType, Schema};
use std::sync::Arc;

/// Query executor for parsed SQL queries
#[derive(Debug, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    /// Create a new query executor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Execute a query plan against storage
    ///
    /// # Errors
    /// Returns error if:
    /// - Storage holds no batches
    /// - A referenced column is not in the schema
    /// - A filtered column is not numeric
    ///
    /// # Example
    /// ```rust,no_run
    /// use credit_sweep::query::{QueryEngine, QueryExecutor};
    /// use credit_sweep::storage::StorageEngine;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let storage = StorageEngine::load_parquet("data/credit.parquet")?;
    /// let plan = QueryEngine::new().parse("SELECT age, cred FROM credit WHERE age > 30")?;
    /// let result = QueryExecutor::new().execute(&plan, &storage)?;
    ///
    /// println!("Results: {} rows", result.num_rows());
    /// # Ok(())
    /// # }
    /// ```
    pub fn execute(&self, plan: &QueryPlan, storage: &StorageEngine) -> Result<RecordBatch> {
        let batches = storage.batches();
        if batches.is_empty() {
            return Err(Error::InvalidInput(format!(
                "No data in table: {}",
                plan.table
            )));
        }

        let combined = Self::combine_batches(batches)?;

        let filtered = if plan.filter.is_empty() {
            combined
        } else {
            Self::apply_filter(&combined, &plan.filter)?
        };

        let projected = if plan.selects_all() {
            filtered
        } else {
            Self::project_columns(&filtered, &plan.columns)?
        };

        Ok(match plan.limit {
            Some(limit) => projected.slice(0, limit.min(projected.num_rows())),
            None => projected,
        })
    }

    fn combine_batches(batches: &[RecordBatch]) -> Result<RecordBatch> {
        if batches.len() == 1 {
            return Ok(batches[0].clone());
        }

        compute::concat_batches(&batches[0].schema(), batches)
            .map_err(|e| Error::StorageError(format!("Failed to combine batches: {e}")))
    }

    fn column_index(schema: &Schema, name: &str) -> Result<usize> {
        schema
            .fields()
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| Error::InvalidInput(format!("Column not found: {name}")))
    }

    /// Keep rows where every predicate holds; null cells never match
    fn apply_filter(batch: &RecordBatch, predicates: &[Predicate]) -> Result<RecordBatch> {
        let schema = batch.schema();
        let mut keep = vec![true; batch.num_rows()];

        for predicate in predicates {
            let index = Self::column_index(&schema, &predicate.column)?;
            let column = batch.column(index);
            if !column.data_type().is_numeric() {
                return Err(Error::InvalidInput(format!(
                    "Filter not supported for data type: {:?}",
                    column.data_type()
                )));
            }

            let as_f64 = compute::cast(column, &DataType::Float64)?;
            let values = as_f64
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    Error::StorageError("Failed to downcast to Float64Array".to_string())
                })?;

            for (row, slot) in keep.iter_mut().enumerate() {
                *slot = *slot
                    && !values.is_null(row)
                    && predicate.op.holds(values.value(row), predicate.value);
            }
        }

        let mask = BooleanArray::from(keep);
        compute::filter_record_batch(batch, &mask)
            .map_err(|e| Error::StorageError(format!("Failed to apply filter: {e}")))
    }

    fn project_columns(batch: &RecordBatch, columns: &[String]) -> Result<RecordBatch> {
        let schema = batch.schema();
        let mut new_columns = Vec::with_capacity(columns.len());
        let mut new_fields = Vec::with_capacity(columns.len());

        for col_name in columns {
            let index = Self::column_index(&schema, col_name)?;
            new_columns.push(batch.column(index).clone());
            new_fields.push(schema.field(index).clone());
        }

        let new_schema = Arc::new(Schema::new(new_fields));
        RecordBatch::try_new(new_schema, new_columns)
            .map_err(|e| Error::StorageError(format!("Failed to project columns: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryEngine;
    use arrow::array::{Int32Array, Int64Array, StringArray};
    use arrow::datatypes::Field;

    fn credit_storage() -> StorageEngine {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, true),
            Field::new("cred_amt", DataType::Int32, false),
            Field::new("cred", DataType::Int64, false),
            Field::new("note", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(67), Some(22), None, Some(45)])),
                Arc::new(Int32Array::from(vec![1169, 5951, 2096, 7882])),
                Arc::new(Int64Array::from(vec![1, 0, 1, 1])),
                Arc::new(StringArray::from(vec!["a", "b", "c", "d"])),
            ],
        )
        .unwrap();
        StorageEngine::new(vec![batch.clone(), batch])
    }

    fn run(sql: &str) -> Result<RecordBatch> {
        let plan = QueryEngine::new().parse(sql)?;
        QueryExecutor::new().execute(&plan, &credit_storage())
    }

    #[test]
    fn test_select_star_combines_batches() {
        let result = run("SELECT * FROM credit").unwrap();
        assert_eq!(result.num_rows(), 8);
        assert_eq!(result.num_columns(), 4);
    }

    #[test]
    fn test_filter_skips_nulls_and_applies_all_predicates() {
        let result = run("SELECT age FROM credit WHERE age > 30 AND cred_amt < 5000").unwrap();
        assert_eq!(result.num_rows(), 2);
        let ages = result
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ages.value(0), 67);
    }

    #[test]
    fn test_projection_order_follows_query() {
        let result = run("SELECT cred, age FROM credit").unwrap();
        assert_eq!(result.schema().field(0).name(), "cred");
        assert_eq!(result.schema().field(1).name(), "age");
    }

    #[test]
    fn test_limit() {
        assert_eq!(run("SELECT * FROM credit LIMIT 3").unwrap().num_rows(), 3);
        assert_eq!(run("SELECT * FROM credit LIMIT 100").unwrap().num_rows(), 8);
    }

    #[test]
    fn test_unknown_column() {
        let err = run("SELECT missing FROM credit").unwrap_err();
        assert!(err.to_string().contains("Column not found: missing"));
    }

    #[test]
    fn test_filter_on_string_column_rejected() {
        assert!(matches!(
            run("SELECT * FROM credit WHERE note = 1"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_storage() {
        let plan = QueryEngine::new().parse("SELECT * FROM credit").unwrap();
        let result = QueryExecutor::new().execute(&plan, &StorageEngine::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
