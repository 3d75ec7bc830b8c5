//! Sweep configuration
//!
//! Every field has a default, so a JSON file only needs the keys it
//! changes:
//!
//! ```json
//! { "num_trials": 10, "depth_candidates": [2, 4, 6], "tree": { "impurity": "entropy" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::TreeParams;
use crate::{Error, Result};

/// Deepest tree the sweep accepts
pub const MAX_SUPPORTED_DEPTH: usize = 30;

/// Parameters of a depth sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Maximum depths to try, in sweep order
    pub depth_candidates: Vec<usize>,
    /// Number of resplit rounds over the candidates
    pub num_trials: usize,
    /// Share of examples used for training in each split
    pub train_fraction: f64,
    /// Remaining tree parameters; `max_depth` is overridden per candidate
    pub tree: TreeParams,
    /// Pins the master generator that derives each split's seed
    ///
    /// Fixes every split (seed, sizes and membership). Fitted trees may
    /// still differ between runs when the trainer breaks score ties
    /// nondeterministically, as `linfa-trees` does.
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            depth_candidates: vec![2, 3, 4, 5, 6, 7],
            num_trials: 30,
            train_fraction: 0.8,
            tree: TreeParams::default(),
            seed: None,
        }
    }
}

impl SweepConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns `Json` on malformed input and `InvalidConfig` when a value is
    /// out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rows a successful sweep produces
    #[must_use]
    pub fn expected_rows(&self) -> usize {
        self.num_trials * self.depth_candidates.len()
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty or out-of-range depth list, zero
    /// trials, or a train fraction outside (0, 1).
    pub fn validate(&self) -> Result<()> {
        if self.depth_candidates.is_empty() {
            return Err(Error::InvalidConfig(
                "depth_candidates must not be empty".to_string(),
            ));
        }
        if let Some(depth) = self
            .depth_candidates
            .iter()
            .find(|&&d| d == 0 || d > MAX_SUPPORTED_DEPTH)
        {
            return Err(Error::InvalidConfig(format!(
                "max depth {depth} outside 1..={MAX_SUPPORTED_DEPTH}"
            )));
        }
        if self.num_trials == 0 {
            return Err(Error::InvalidConfig(
                "num_trials must be at least 1".to_string(),
            ));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "train_fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }
        Ok(())
    }
}

/// Builder for `SweepConfig`
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    config: SweepConfig,
}

impl SweepConfigBuilder {
    /// Set the depths to sweep
    #[must_use]
    pub fn depth_candidates(mut self, depths: impl IntoIterator<Item = usize>) -> Self {
        self.config.depth_candidates = depths.into_iter().collect();
        self
    }

    /// Set the number of trials
    #[must_use]
    pub fn num_trials(mut self, num_trials: usize) -> Self {
        self.config.num_trials = num_trials;
        self
    }

    /// Set the training share of each split
    #[must_use]
    pub fn train_fraction(mut self, fraction: f64) -> Self {
        self.config.train_fraction = fraction;
        self
    }

    /// Set the base tree parameters
    #[must_use]
    pub fn tree(mut self, tree: TreeParams) -> Self {
        self.config.tree = tree;
        self
    }

    /// Pin the master seed so every run draws the same splits
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` as [`SweepConfig::validate`].
    pub fn build(self) -> Result<SweepConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
