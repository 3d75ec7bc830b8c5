//! Categorical feature registry
//!
//! Maps a zero-based feature index to the number of categories that feature
//! takes. Indices absent from the registry are continuous. The registry is
//! built once from the schema and handed read-only to the trainer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::LabeledExample;
use crate::{Error, Result};

/// Feature index → category count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalRegistry {
    cardinalities: BTreeMap<usize, u32>,
}

impl CategoricalRegistry {
    /// Build a registry from `(index, cardinality)` pairs
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a cardinality is below 2 or an index is
    /// listed twice.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        let mut cardinalities = BTreeMap::new();
        for (index, cardinality) in entries {
            if cardinality < 2 {
                return Err(Error::SchemaError(format!(
                    "Categorical feature {index} has cardinality {cardinality}, expected at least 2"
                )));
            }
            if cardinalities.insert(index, cardinality).is_some() {
                return Err(Error::SchemaError(format!(
                    "Categorical feature {index} registered twice"
                )));
            }
        }
        Ok(Self { cardinalities })
    }

    /// Registry of the German credit table, as laid out by
    /// [`CreditSchema::german_credit`](crate::schema::CreditSchema::german_credit)
    #[must_use]
    pub fn german_credit() -> Self {
        let cardinalities = [
            (0, 4),
            (5, 5),
            (6, 5),
            (7, 4),
            (8, 4),
            (9, 3),
            (10, 4),
            (11, 4),
            (13, 3),
            (14, 3),
            (15, 4),
            (16, 4),
            (17, 2),
            (18, 2),
            (19, 2),
        ]
        .into_iter()
        .collect();
        Self { cardinalities }
    }

    /// Category count of a feature, `None` for continuous features
    #[must_use]
    pub fn cardinality(&self, index: usize) -> Option<u32> {
        self.cardinalities.get(&index).copied()
    }

    /// True if the feature at `index` is categorical
    #[must_use]
    pub fn is_categorical(&self, index: usize) -> bool {
        self.cardinalities.contains_key(&index)
    }

    /// Registered features in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.cardinalities.iter().map(|(&i, &c)| (i, c))
    }

    /// Number of categorical features
    #[must_use]
    pub fn len(&self) -> usize {
        self.cardinalities.len()
    }

    /// True when every feature is continuous
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cardinalities.is_empty()
    }

    /// Largest registered cardinality (0 when nothing is registered)
    #[must_use]
    pub fn max_cardinality(&self) -> u32 {
        self.cardinalities.values().copied().max().unwrap_or(0)
    }

    /// Check every registered index addresses a real feature slot
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` naming the first index outside
    /// `[0, feature_count)`.
    pub fn validate(&self, feature_count: usize) -> Result<()> {
        match self.cardinalities.keys().find(|&&i| i >= feature_count) {
            Some(index) => Err(Error::SchemaError(format!(
                "Categorical feature index {index} out of range for {feature_count} features"
            ))),
            None => Ok(()),
        }
    }

    /// Check every example against the first one's feature count and every
    /// registered feature against its category range
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` naming the first example with a different
    /// feature count, or with a categorical value that is not a whole
    /// number in `[0, cardinality)`.
    pub fn check_examples(&self, examples: &[LabeledExample]) -> Result<()> {
        let Some(first) = examples.first() else {
            return Ok(());
        };
        let feature_count = first.feature_count();
        self.validate(feature_count)?;

        for (row, example) in examples.iter().enumerate() {
            let features = example.features();
            if features.len() != feature_count {
                return Err(Error::SchemaError(format!(
                    "Example {row} has {} features, expected {feature_count}",
                    features.len()
                )));
            }
            for (index, cardinality) in self.iter() {
                let value = features[index];
                let in_range =
                    value >= 0.0 && value.fract() == 0.0 && value < f64::from(cardinality);
                if !in_range {
                    return Err(Error::SchemaError(format!(
                        "Example {row}: categorical feature {index} = {value} outside [0, {cardinality})"
                    )));
                }
            }
        }
        Ok(())
    }
}
