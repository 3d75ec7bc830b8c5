//! Source → examples
//!
//! Glues the record source, the schema-derived transformer and the
//! registry together so callers get training-ready examples from one call.

use crate::record::LabeledExample;
use crate::registry::CategoricalRegistry;
use crate::schema::CreditSchema;
use crate::source::RecordSource;
use crate::Result;

/// Examples plus the registry describing their categorical slots
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDataset {
    /// One example per fetched row
    pub examples: Vec<LabeledExample>,
    /// Categorical slots of `examples`
    pub registry: CategoricalRegistry,
}

/// Fetch every row of `table` and transform it with `schema`
///
/// # Errors
///
/// Returns query errors from the source and `SchemaError` for rows that do
/// not fit the schema.
pub fn load_examples<S: RecordSource + ?Sized>(
    source: &S,
    table: &str,
    schema: &CreditSchema,
) -> Result<PreparedDataset> {
    let records = source.fetch(&schema.select_sql(table))?;
    let transformer = schema.transformer();
    let registry = schema.registry()?;
    registry.validate(transformer.feature_count())?;

    let examples = transformer.transform_all(&records)?;
    tracing::info!(
        table,
        examples = examples.len(),
        features = transformer.feature_count(),
        "Prepared training examples"
    );

    Ok(PreparedDataset { examples, registry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use crate::schema::SchemaField;
    use crate::Error;

    struct FixedSource(Vec<RawRecord>);

    impl RecordSource for FixedSource {
        fn fetch(&self, sql: &str) -> Result<Vec<RawRecord>> {
            assert!(sql.starts_with("SELECT"));
            Ok(self.0.clone())
        }
    }

    fn schema() -> CreditSchema {
        CreditSchema::new(
            "cred",
            vec![SchemaField::categorical("acct_bal", 4), SchemaField::continuous("age")],
        )
    }

    #[test]
    fn test_load_examples() {
        let source = FixedSource(vec![
            [("acct_bal", 4), ("age", 30), ("cred", 0)].into_iter().collect(),
            [("acct_bal", 1), ("age", 52), ("cred", 1)].into_iter().collect(),
        ]);
        let prepared = load_examples(&source, "credit", &schema()).unwrap();
        assert_eq!(prepared.examples.len(), 2);
        assert_eq!(prepared.examples[0].features(), &[3.0, 30.0]);
        assert_eq!(prepared.registry.cardinality(0), Some(4));
    }

    #[test]
    fn test_load_examples_schema_error() {
        let source = FixedSource(vec![[("acct_bal", 1), ("cred", 1)].into_iter().collect()]);
        assert!(matches!(
            load_examples(&source, "credit", &schema()),
            Err(Error::SchemaError(_))
        ));
    }
}
