//! Raw source rows and the labeled examples built from them

use serde::{Deserialize, Serialize};

/// Class identifier used as a training label
pub type ClassId = usize;

/// One source row: field name → raw integer value, in column order.
///
/// Null cells are simply absent, so a missing field and a null field look
/// the same to the transformer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: Vec<(String, i64)>,
}

impl RawRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: i64) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Value of a field, if present
    #[must_use]
    pub fn get(&self, name: &str) -> Option<i64> {
        self.fields
            .iter()
            .find_map(|(n, v)| (n == name).then_some(*v))
    }

    /// Number of fields present
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A label plus its feature vector.
///
/// Built once per raw record and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    label: ClassId,
    features: Vec<f64>,
}

impl LabeledExample {
    /// Create a labeled example
    #[must_use]
    pub fn new(label: ClassId, features: Vec<f64>) -> Self {
        Self { label, features }
    }

    /// Class label
    #[must_use]
    pub const fn label(&self) -> ClassId {
        self.label
    }

    /// Feature vector
    #[must_use]
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    /// Length of the feature vector
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}
