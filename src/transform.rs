//! Record transformer: raw source rows → labeled examples

use serde::{Deserialize, Serialize};

use crate::record::{ClassId, LabeledExample, RawRecord};
use crate::{Error, Result};

/// How a field's raw integer is encoded at the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Used verbatim
    ZeroBased,
    /// Category ids start at 1 and are shifted down by one
    OneBased,
}

/// A feature field and its source encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureField {
    /// Source column name
    pub name: String,
    /// Source encoding
    pub encoding: Encoding,
}

impl FeatureField {
    /// Field copied verbatim
    #[must_use]
    pub fn zero_based(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoding: Encoding::ZeroBased,
        }
    }

    /// Field whose raw values start at 1
    #[must_use]
    pub fn one_based(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoding: Encoding::OneBased,
        }
    }
}

/// Turns raw records into labeled examples using a fixed field order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTransformer {
    label_field: String,
    fields: Vec<FeatureField>,
}

impl RecordTransformer {
    /// Create a transformer
    ///
    /// `fields` fixes the feature order; the label field must not be among
    /// them.
    #[must_use]
    pub fn new(label_field: impl Into<String>, fields: Vec<FeatureField>) -> Self {
        Self {
            label_field: label_field.into(),
            fields,
        }
    }

    /// Name of the label field
    #[must_use]
    pub fn label_field(&self) -> &str {
        &self.label_field
    }

    /// Feature fields in output order
    #[must_use]
    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    /// Length of every produced feature vector
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.fields.len()
    }

    /// Transform one record
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the label or a feature field is missing, the
    /// label is negative, or a one-based field holds a value below 1.
    #[allow(clippy::cast_precision_loss)]
    pub fn transform(&self, record: &RawRecord) -> Result<LabeledExample> {
        let raw_label = Self::required(record, &self.label_field)?;
        let label = ClassId::try_from(raw_label).map_err(|_| {
            Error::SchemaError(format!(
                "Label field '{}' holds negative value {raw_label}",
                self.label_field
            ))
        })?;

        let features = self
            .fields
            .iter()
            .map(|field| {
                let raw = Self::required(record, &field.name)?;
                let value = match field.encoding {
                    Encoding::ZeroBased => raw,
                    Encoding::OneBased if raw >= 1 => raw - 1,
                    Encoding::OneBased => {
                        return Err(Error::SchemaError(format!(
                            "Field '{}' is one-based but holds {raw}",
                            field.name
                        )))
                    }
                };
                Ok(value as f64)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LabeledExample::new(label, features))
    }

    /// Transform every record, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first `SchemaError`, annotated with the row index.
    pub fn transform_all(&self, records: &[RawRecord]) -> Result<Vec<LabeledExample>> {
        records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                self.transform(record).map_err(|e| match e {
                    Error::SchemaError(msg) => Error::SchemaError(format!("row {row}: {msg}")),
                    other => other,
                })
            })
            .collect()
    }

    fn required(record: &RawRecord, name: &str) -> Result<i64> {
        record
            .get(name)
            .ok_or_else(|| Error::SchemaError(format!("Missing required field '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer() -> RecordTransformer {
        RecordTransformer::new(
            "cred",
            vec![
                FeatureField::one_based("acct_bal"),
                FeatureField::zero_based("age"),
            ],
        )
    }

    #[test]
    fn test_one_based_fields_shift_down() {
        let record: RawRecord = [("acct_bal", 1), ("age", 67), ("cred", 1)]
            .into_iter()
            .collect();
        let example = transformer().transform(&record).unwrap();
        assert_eq!(example.label(), 1);
        assert_eq!(example.features(), &[0.0, 67.0]);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let record: RawRecord = [("acct_bal", 3), ("age", 30), ("cred", 0), ("extra", 9)]
            .into_iter()
            .collect();
        let example = transformer().transform(&record).unwrap();
        assert_eq!(example.feature_count(), 2);
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let record: RawRecord = [("acct_bal", 1), ("cred", 1)].into_iter().collect();
        let err = transformer().transform(&record).unwrap_err();
        assert!(matches!(err, Error::SchemaError(ref m) if m.contains("'age'")));
    }

    #[test]
    fn test_missing_label_is_schema_error() {
        let record: RawRecord = [("acct_bal", 1), ("age", 40)].into_iter().collect();
        assert!(matches!(
            transformer().transform(&record),
            Err(Error::SchemaError(_))
        ));
    }

    #[test]
    fn test_one_based_zero_value_rejected() {
        let record: RawRecord = [("acct_bal", 0), ("age", 40), ("cred", 1)]
            .into_iter()
            .collect();
        let err = transformer().transform(&record).unwrap_err();
        assert!(err.to_string().contains("one-based"));
    }

    #[test]
    fn test_negative_label_rejected() {
        let record: RawRecord = [("acct_bal", 1), ("age", 40), ("cred", -1)]
            .into_iter()
            .collect();
        assert!(transformer().transform(&record).is_err());
    }

    #[test]
    fn test_transform_all_reports_row() {
        let good: RawRecord = [("acct_bal", 1), ("age", 40), ("cred", 1)]
            .into_iter()
            .collect();
        let bad: RawRecord = [("age", 40), ("cred", 1)].into_iter().collect();
        let err = transformer().transform_all(&[good, bad]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
