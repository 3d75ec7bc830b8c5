//! Training collaborator
//!
//! Tree induction itself is delegated: [`TreeTrainer`] is the seam the
//! sweep driver calls through, and [`LinfaTreeTrainer`] plugs the
//! `linfa-trees` CART implementation into it.
//!
//! ## Usage
//!
//! ```rust
//! use credit_sweep::model::{LinfaTreeTrainer, TreeModel, TreeParams, TreeTrainer};
//! use credit_sweep::record::LabeledExample;
//! use credit_sweep::registry::CategoricalRegistry;
//!
//! # fn main() -> credit_sweep::Result<()> {
//! let examples: Vec<_> = (0..20)
//!     .map(|i| LabeledExample::new(usize::from(i >= 10), vec![f64::from(i)]))
//!     .collect();
//!
//! let params = TreeParams::default().with_max_depth(2);
//! let model = LinfaTreeTrainer::new().train(&examples, &CategoricalRegistry::default(), &params)?;
//! assert_eq!(model.predict(&[15.0]), 1);
//! # Ok(())
//! # }
//! ```

mod linfa_backend;

pub use linfa_backend::{LinfaTreeModel, LinfaTreeTrainer};

use serde::{Deserialize, Serialize};

use crate::record::{ClassId, LabeledExample};
use crate::registry::CategoricalRegistry;
use crate::{Error, Result};

/// Split-quality criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impurity {
    /// Gini impurity
    #[default]
    Gini,
    /// Information entropy
    Entropy,
}

/// Parameters handed to the trainer for one fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Split-quality criterion
    pub impurity: Impurity,
    /// Maximum number of edges from root to any leaf
    pub max_depth: usize,
    /// Maximum bins for continuous-feature discretization; must cover the
    /// largest categorical cardinality
    pub max_bins: u32,
    /// Minimum examples each child must receive for a split to be kept
    pub min_instances_per_node: usize,
    /// Minimum impurity decrease for a split to be kept
    pub min_info_gain: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            impurity: Impurity::Gini,
            max_depth: 5,
            max_bins: 32,
            min_instances_per_node: 1,
            min_info_gain: 0.0,
        }
    }
}

impl TreeParams {
    /// Copy of these parameters with a different depth limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check the parameters against the categorical registry
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `max_bins` is below 2 or below the largest
    /// categorical cardinality, `min_instances_per_node` is zero, or
    /// `min_info_gain` is negative or not finite.
    pub fn validate(&self, registry: &CategoricalRegistry) -> Result<()> {
        if self.max_bins < 2 {
            return Err(Error::InvalidConfig(format!(
                "max_bins must be at least 2, got {}",
                self.max_bins
            )));
        }
        if self.max_bins < registry.max_cardinality() {
            return Err(Error::InvalidConfig(format!(
                "max_bins ({}) must be at least the largest categorical cardinality ({})",
                self.max_bins,
                registry.max_cardinality()
            )));
        }
        if self.min_instances_per_node == 0 {
            return Err(Error::InvalidConfig(
                "min_instances_per_node must be at least 1".to_string(),
            ));
        }
        if !self.min_info_gain.is_finite() || self.min_info_gain < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_info_gain must be a non-negative number, got {}",
                self.min_info_gain
            )));
        }
        Ok(())
    }
}

/// A trained classification tree
pub trait TreeModel {
    /// Predicted class for one feature vector
    fn predict(&self, features: &[f64]) -> ClassId;

    /// Predicted classes for a batch, one per example in input order
    fn predict_all(&self, examples: &[LabeledExample]) -> Vec<ClassId> {
        examples.iter().map(|e| self.predict(e.features())).collect()
    }

    /// Realized depth of the tree
    fn depth(&self) -> usize;

    /// Total number of nodes, leaves included
    fn node_count(&self) -> usize;
}

/// Fits a classification tree to labeled examples
pub trait TreeTrainer {
    /// Model produced by a successful fit
    type Model: TreeModel;

    /// Fit a tree
    ///
    /// # Errors
    ///
    /// Returns `TrainingFailure` when the underlying library rejects the
    /// data or parameters.
    fn train(
        &self,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
        params: &TreeParams,
    ) -> Result<Self::Model>;
}
