//! Error types for credit-sweep
//!
//! Schema and training failures are unrecoverable at this layer: they
//! propagate to the caller and abort whatever pipeline or sweep was running.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// credit-sweep error types
#[derive(Error, Debug)]
pub enum Error {
    /// A raw record does not fit the expected schema
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// The tree-training collaborator rejected the data or parameters
    #[error("Training failed: {0}")]
    TrainingFailure(String),

    /// Misclassification rate requested over an empty partition
    #[error("Cannot evaluate {0} partition: no examples")]
    EmptyPartition(&'static str),

    /// Sweep or training configuration is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Query parsing error
    #[error("SQL parse error: {0}")]
    ParseError(String),

    /// Query refers to something the data does not have
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error (Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow/Parquet error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
