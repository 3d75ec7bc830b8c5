//! `linfa-trees` backed trainer
//!
//! linfa's CART splits every column on a numeric threshold, so categorical
//! features are expanded into one indicator column per category before
//! fitting. Continuous features pass through unchanged.

use std::fmt;

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, ArrayViewMut1};

use super::{Impurity, TreeModel, TreeParams, TreeTrainer};
use crate::record::{ClassId, LabeledExample};
use crate::registry::CategoricalRegistry;
use crate::{Error, Result};

/// Where one source feature lands in the encoded row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Continuous { source: usize },
    OneHot { source: usize, cardinality: usize },
}

impl Slot {
    const fn width(self) -> usize {
        match self {
            Self::Continuous { .. } => 1,
            Self::OneHot { cardinality, .. } => cardinality,
        }
    }
}

/// Maps raw feature vectors to linfa input rows
#[derive(Debug, Clone, PartialEq, Eq)]
struct FeatureEncoder {
    slots: Vec<Slot>,
    width: usize,
}

impl FeatureEncoder {
    fn new(feature_count: usize, registry: &CategoricalRegistry) -> Self {
        let slots: Vec<Slot> = (0..feature_count)
            .map(|source| match registry.cardinality(source) {
                Some(cardinality) => Slot::OneHot {
                    source,
                    cardinality: cardinality as usize,
                },
                None => Slot::Continuous { source },
            })
            .collect();
        let width = slots.iter().map(|s| s.width()).sum();
        Self { slots, width }
    }

    /// Category id of a one-hot slot, `None` when not a valid id
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn category(value: f64, cardinality: usize) -> Option<usize> {
        let in_range = value >= 0.0 && value.fract() == 0.0 && value < cardinality as f64;
        in_range.then_some(value as usize)
    }

    /// Reject rows the encoding cannot represent
    fn check(&self, row: usize, features: &[f64]) -> Result<()> {
        if features.len() != self.slots.len() {
            return Err(Error::TrainingFailure(format!(
                "example {row} has {} features, expected {}",
                features.len(),
                self.slots.len()
            )));
        }
        for slot in &self.slots {
            if let Slot::OneHot {
                source,
                cardinality,
            } = *slot
            {
                let value = features[source];
                if Self::category(value, cardinality).is_none() {
                    return Err(Error::TrainingFailure(format!(
                        "example {row}: categorical feature {source} = {value} outside [0, {cardinality})"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Write one encoded row into a zeroed output row. Rows that `check`
    /// would reject encode missing features as 0 and unknown categories
    /// with no indicator set.
    fn encode_row(&self, features: &[f64], mut out: ArrayViewMut1<'_, f64>) {
        let mut column = 0;
        for slot in &self.slots {
            match *slot {
                Slot::Continuous { source } => {
                    out[column] = features.get(source).copied().unwrap_or(0.0);
                }
                Slot::OneHot {
                    source,
                    cardinality,
                } => {
                    if let Some(category) = features
                        .get(source)
                        .and_then(|&v| Self::category(v, cardinality))
                    {
                        out[column + category] = 1.0;
                    }
                }
            }
            column += slot.width();
        }
    }

    /// One encoded row per input row, `width` columns each
    fn encode_all(&self, rows: &[&[f64]]) -> Array2<f64> {
        let mut records = Array2::zeros((rows.len(), self.width));
        for (features, out) in rows.iter().zip(records.rows_mut()) {
            self.encode_row(features, out);
        }
        records
    }
}

/// Trainer delegating to `linfa_trees::DecisionTree`
///
/// Parameter mapping:
/// - `impurity` → `split_quality`
/// - `max_depth` → `max_depth`
/// - `min_instances_per_node` → `min_weight_leaf` (and twice that for
///   `min_weight_split`)
/// - `min_info_gain` → `min_impurity_decrease`, floored at machine epsilon
///   since linfa requires a positive value
///
/// `max_bins` is validated but unused: linfa scans every distinct
/// threshold instead of binning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinfaTreeTrainer;

impl LinfaTreeTrainer {
    /// Create a trainer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TreeTrainer for LinfaTreeTrainer {
    type Model = LinfaTreeModel;

    #[allow(clippy::cast_precision_loss)]
    fn train(
        &self,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
        params: &TreeParams,
    ) -> Result<Self::Model> {
        let Some(first) = examples.first() else {
            return Err(Error::TrainingFailure("no training examples".to_string()));
        };

        let feature_count = first.feature_count();
        registry
            .validate(feature_count)
            .map_err(|e| Error::TrainingFailure(e.to_string()))?;

        let encoder = FeatureEncoder::new(feature_count, registry);
        for (row, example) in examples.iter().enumerate() {
            encoder.check(row, example.features())?;
        }

        let rows: Vec<&[f64]> = examples.iter().map(LabeledExample::features).collect();
        let records = encoder.encode_all(&rows);
        let targets: Array1<ClassId> = examples.iter().map(LabeledExample::label).collect();
        let dataset = Dataset::new(records, targets);

        let split_quality = match params.impurity {
            Impurity::Gini => SplitQuality::Gini,
            Impurity::Entropy => SplitQuality::Entropy,
        };
        let min_leaf = params.min_instances_per_node as f32;

        let tree = DecisionTree::<f64, ClassId>::params()
            .split_quality(split_quality)
            .max_depth(Some(params.max_depth))
            .min_weight_split(2.0 * min_leaf)
            .min_weight_leaf(min_leaf)
            .min_impurity_decrease(params.min_info_gain.max(f64::EPSILON))
            .fit(&dataset)
            .map_err(|e: linfa::Error| Error::TrainingFailure(e.to_string()))?;

        let model = LinfaTreeModel {
            depth: tree.max_depth(),
            node_count: tree.iter_nodes().count(),
            tree,
            encoder,
        };

        tracing::trace!(
            examples = examples.len(),
            encoded_width = model.encoder.width,
            depth = model.depth,
            nodes = model.node_count,
            "Fitted decision tree"
        );

        Ok(model)
    }
}

/// Tree fitted by [`LinfaTreeTrainer`]
pub struct LinfaTreeModel {
    tree: DecisionTree<f64, ClassId>,
    encoder: FeatureEncoder,
    depth: usize,
    node_count: usize,
}

impl fmt::Debug for LinfaTreeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinfaTreeModel")
            .field("depth", &self.depth)
            .field("node_count", &self.node_count)
            .field("encoded_width", &self.encoder.width)
            .finish_non_exhaustive()
    }
}

impl LinfaTreeModel {
    fn predict_rows(&self, rows: &[&[f64]]) -> Vec<ClassId> {
        if rows.is_empty() {
            return Vec::new();
        }
        let predictions: Array1<ClassId> = self.tree.predict(&self.encoder.encode_all(rows));
        predictions.to_vec()
    }
}

impl TreeModel for LinfaTreeModel {
    fn predict(&self, features: &[f64]) -> ClassId {
        self.predict_rows(&[features]).first().copied().unwrap_or_default()
    }

    fn predict_all(&self, examples: &[LabeledExample]) -> Vec<ClassId> {
        let rows: Vec<&[f64]> = examples.iter().map(LabeledExample::features).collect();
        self.predict_rows(&rows)
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn node_count(&self) -> usize {
        self.node_count
    }
}
