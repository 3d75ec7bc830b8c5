//! Field table of the credit-scoring dataset
//!
//! One entry per source column: its encoding at the source and whether the
//! trainer should treat it as categorical. The record transformer and the
//! categorical registry are both derived from this table, so they cannot
//! disagree about feature positions.

use serde::{Deserialize, Serialize};

use crate::registry::CategoricalRegistry;
use crate::transform::{Encoding, FeatureField, RecordTransformer};
use crate::Result;

/// How the trainer reads a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Magnitude used directly
    Continuous,
    /// Unordered category id in `[0, cardinality)` after encoding
    Categorical {
        /// Number of categories
        cardinality: u32,
    },
}

/// One feature column of the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Column name
    pub name: String,
    /// Source encoding
    pub encoding: Encoding,
    /// Trainer interpretation
    pub kind: FeatureKind,
}

impl SchemaField {
    /// Zero-based continuous column
    #[must_use]
    pub fn continuous(name: &str) -> Self {
        Self {
            name: name.to_string(),
            encoding: Encoding::ZeroBased,
            kind: FeatureKind::Continuous,
        }
    }

    /// One-based categorical column
    #[must_use]
    pub fn categorical(name: &str, cardinality: u32) -> Self {
        Self {
            name: name.to_string(),
            encoding: Encoding::OneBased,
            kind: FeatureKind::Categorical { cardinality },
        }
    }
}

/// Label field plus ordered feature fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSchema {
    label: String,
    fields: Vec<SchemaField>,
}

impl CreditSchema {
    /// Create a schema from a label column and ordered feature columns
    #[must_use]
    pub fn new(label: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            label: label.into(),
            fields,
        }
    }

    /// German credit table (1000 applicants, 20 attributes, `cred` = 1 for
    /// creditworthy).
    ///
    /// Categorical attributes are stored one-based; `pay_stat` and `purpose`
    /// are zero-based codes treated as ordinal.
    #[must_use]
    pub fn german_credit() -> Self {
        Self::new(
            "cred",
            vec![
                SchemaField::categorical("acct_bal", 4),
                SchemaField::continuous("dur_cred"),
                SchemaField::continuous("pay_stat"),
                SchemaField::continuous("purpose"),
                SchemaField::continuous("cred_amt"),
                SchemaField::categorical("value", 5),
                SchemaField::categorical("len_emp", 5),
                SchemaField::categorical("install_pc", 4),
                SchemaField::categorical("sex_married", 4),
                SchemaField::categorical("guarantors", 3),
                SchemaField::categorical("dur_addr", 4),
                SchemaField::categorical("max_val", 4),
                SchemaField::continuous("age"),
                SchemaField::categorical("concurr", 3),
                SchemaField::categorical("typ_aprtmnt", 3),
                SchemaField::categorical("no_creds", 4),
                SchemaField::categorical("occupation", 4),
                SchemaField::categorical("no_dep", 2),
                SchemaField::categorical("telephone", 2),
                SchemaField::categorical("foreign_wkr", 2),
            ],
        )
    }

    /// Label column name
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Feature columns in feature-vector order
    #[must_use]
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Transformer producing feature vectors in schema order
    #[must_use]
    pub fn transformer(&self) -> RecordTransformer {
        let fields = self
            .fields
            .iter()
            .map(|f| FeatureField {
                name: f.name.clone(),
                encoding: f.encoding,
            })
            .collect();
        RecordTransformer::new(self.label.clone(), fields)
    }

    /// Registry of the categorical columns, indexed by feature position
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a categorical column declares fewer than two
    /// categories.
    pub fn registry(&self) -> Result<CategoricalRegistry> {
        CategoricalRegistry::new(self.fields.iter().enumerate().filter_map(|(i, f)| {
            match f.kind {
                FeatureKind::Categorical { cardinality } => Some((i, cardinality)),
                FeatureKind::Continuous => None,
            }
        }))
    }

    /// `SELECT <features>, <label> FROM <table>`, column names quoted
    #[must_use]
    pub fn select_sql(&self, table: &str) -> String {
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(std::iter::once(self.label.as_str()))
            .map(|name| format!("\"{name}\""))
            .collect();
        format!("SELECT {} FROM {table}", columns.join(", "))
    }
}
