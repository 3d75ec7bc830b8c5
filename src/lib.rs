//! # credit-sweep: Decision-Tree Depth Sweeps for Credit Scoring
//!
//! Loads credit-scoring rows from a SQL-queryable table, turns them into
//! labeled examples, fits decision trees through an external tree library,
//! and sweeps the depth limit over repeated random train/validation splits
//! to expose overfitting.
//!
//! ## Pipeline
//!
//! ```text
//! Parquet ─► StorageEngine ─► Catalog (SQL) ─► RawRecord
//!     ─► RecordTransformer ─► LabeledExample ─► SweepDriver ─► SweepTable
//!                               CategoricalRegistry ──┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use credit_sweep::config::SweepConfig;
//! use credit_sweep::model::LinfaTreeTrainer;
//! use credit_sweep::pipeline::load_examples;
//! use credit_sweep::schema::CreditSchema;
//! use credit_sweep::source::Catalog;
//! use credit_sweep::storage::StorageEngine;
//! use credit_sweep::sweep::SweepDriver;
//!
//! let mut catalog = Catalog::new();
//! catalog.register("credit", StorageEngine::load_parquet("data/german_credit.parquet")?);
//!
//! let data = load_examples(&catalog, "credit", &CreditSchema::german_credit())?;
//! let driver = SweepDriver::new(LinfaTreeTrainer::new(), SweepConfig::default())?;
//! let table = driver.run(&data.examples, &data.registry)?;
//!
//! for summary in table.summarize() {
//!     println!(
//!         "depth {}: train {:.3} validation {:.3}",
//!         summary.max_depth, summary.mean_train_error, summary.mean_validation_error
//!     );
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod registry;
pub mod schema;
pub mod source;
pub mod split;
pub mod storage;
pub mod sweep;
pub mod telemetry;
pub mod transform;

pub use error::{Error, Result};
