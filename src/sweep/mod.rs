//! Depth sweep driver
//!
//! Repeatedly resplits the examples into training and validation
//! partitions, fits one tree per depth candidate, and records both error
//! rates. Plotting training against validation error per depth shows where
//! deeper trees stop generalizing.
//!
//! ```text
//! for trial in 1..=num_trials
//!     for max_depth in depth_candidates
//!         split (fresh seed) → train → evaluate → append row
//! ```
//!
//! Any failure aborts the sweep; no partial table is returned.

mod table;

pub use table::{DepthSummary, SweepRow, SweepTable};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SweepConfig;
use crate::metrics::misclassification_rate;
use crate::model::{TreeModel, TreeTrainer};
use crate::record::LabeledExample;
use crate::registry::CategoricalRegistry;
use crate::split::{partition_sizes, random_split};
use crate::{Error, Result};

/// One fit to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Job {
    trial: usize,
    max_depth: usize,
    seed: u64,
}

/// Sweep table plus when and how it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end
    pub finished_at: DateTime<Utc>,
    /// Configuration the sweep ran with
    pub config: SweepConfig,
    /// Per-fit rows
    pub table: SweepTable,
}

impl SweepReport {
    /// Per-depth statistics of the table
    #[must_use]
    pub fn summary(&self) -> Vec<DepthSummary> {
        self.table.summarize()
    }
}

/// Runs depth sweeps with a given trainer
#[derive(Debug, Clone)]
pub struct SweepDriver<T> {
    trainer: T,
    config: SweepConfig,
}

impl<T: TreeTrainer> SweepDriver<T> {
    /// Create a driver
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(trainer: T, config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { trainer, config })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Trainer in use
    #[must_use]
    pub const fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Run the sweep sequentially
    ///
    /// # Errors
    ///
    /// Returns the first error from validation, splitting, training or
    /// evaluation. Rows computed before the failure are discarded.
    pub fn run(
        &self,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
    ) -> Result<SweepTable> {
        let jobs = self.plan(examples, registry)?;

        let mut table = SweepTable::new();
        for job in &jobs {
            table.append(self.evaluate(job, examples, registry)?);
        }

        self.log_finished(&table);
        Ok(table)
    }

    /// Run the sweep and stamp it with start and finish times
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run).
    pub fn run_report(
        &self,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
    ) -> Result<SweepReport> {
        let started_at = Utc::now();
        let table = self.run(examples, registry)?;
        Ok(SweepReport {
            started_at,
            finished_at: Utc::now(),
            config: self.config.clone(),
            table,
        })
    }

    /// Validate inputs and derive one split seed per fit, in row order.
    /// Every check runs here so a bad input fails before any training.
    fn plan(
        &self,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
    ) -> Result<Vec<Job>> {
        let Some(first) = examples.first() else {
            return Err(Error::EmptyPartition("input"));
        };
        registry.check_examples(examples)?;
        self.config.tree.validate(registry)?;

        let (train_size, validation_size) =
            partition_sizes(examples.len(), self.config.train_fraction)?;
        if train_size == 0 {
            return Err(Error::EmptyPartition("training"));
        }
        if validation_size == 0 {
            return Err(Error::EmptyPartition("validation"));
        }

        let mut master = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let jobs: Vec<Job> = (1..=self.config.num_trials)
            .flat_map(|trial| {
                self.config
                    .depth_candidates
                    .iter()
                    .map(move |&max_depth| (trial, max_depth))
            })
            .map(|(trial, max_depth)| Job {
                trial,
                max_depth,
                seed: master.next_u64(),
            })
            .collect();

        tracing::info!(
            examples = examples.len(),
            features = first.feature_count(),
            categorical = registry.len(),
            trials = self.config.num_trials,
            depths = ?self.config.depth_candidates,
            fits = jobs.len(),
            "Starting depth sweep"
        );

        Ok(jobs)
    }

    fn evaluate(
        &self,
        job: &Job,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
    ) -> Result<SweepRow> {
        let split = random_split(
            examples,
            self.config.train_fraction,
            &mut StdRng::seed_from_u64(job.seed),
        )?;

        let params = self.config.tree.clone().with_max_depth(job.max_depth);
        let model = self.trainer.train(&split.train, registry, &params)?;

        let row = SweepRow {
            trial: job.trial,
            max_depth: job.max_depth,
            depth: model.depth(),
            node_count: model.node_count(),
            train_error: misclassification_rate(&model, &split.train, "training")?,
            validation_error: misclassification_rate(&model, &split.validation, "validation")?,
            train_size: split.train.len(),
            validation_size: split.validation.len(),
            split_seed: job.seed,
        };

        tracing::debug!(
            trial = row.trial,
            max_depth = row.max_depth,
            depth = row.depth,
            nodes = row.node_count,
            train_error = row.train_error,
            validation_error = row.validation_error,
            "Sweep fit"
        );

        Ok(row)
    }

    fn log_finished(&self, table: &SweepTable) {
        tracing::info!(
            rows = table.len(),
            expected = self.config.expected_rows(),
            best_depth = ?table.best_depth(),
            "Depth sweep finished"
        );
    }
}

#[cfg(feature = "parallel")]
impl<T: TreeTrainer + Sync> SweepDriver<T> {
    /// Run the sweep on the rayon thread pool
    ///
    /// Produces rows in the same order as [`run`](Self::run). With a pinned
    /// seed both draw the same splits; whole rows match only when the
    /// trainer itself is deterministic.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run).
    pub fn run_parallel(
        &self,
        examples: &[LabeledExample],
        registry: &CategoricalRegistry,
    ) -> Result<SweepTable> {
        use rayon::prelude::*;

        let jobs = self.plan(examples, registry)?;
        let rows = jobs
            .par_iter()
            .map(|job| self.evaluate(job, examples, registry))
            .collect::<Result<Vec<_>>>()?;

        let table: SweepTable = rows.into_iter().collect();
        self.log_finished(&table);
        Ok(table)
    }
}
