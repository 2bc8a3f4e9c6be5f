//! Error types for the training and evaluation workflow.
//!
//! Library components return [`PipelineError`]; the entry points wrap these
//! in `anyhow` with step context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by configuration, data loading, fitting and artifact I/O.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration document does not exist.
    #[error("Configuration file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// The configuration document is not valid YAML for the settings schema.
    #[error("Failed to parse configuration file {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// A configuration value is present but out of range.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Neither the configured data file nor the bundled dataset is usable.
    #[error("No usable dataset: {0}")]
    DataNotFound(String),

    /// The dataset was loaded but cannot be used for training.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A stage or pipeline was used before `fit`.
    #[error("{0} has not been fitted")]
    NotFitted(String),

    /// Input column count differs from the one seen at fit time.
    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// The classifier (or a stage) could not be fitted on the given data.
    #[error("Fit failed: {0}")]
    FitFailure(String),

    /// No model artifact at the given path.
    #[error("Model artifact not found: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    /// The model artifact exists but cannot be decoded.
    #[error("Model artifact at {} is corrupt: {message}", .path.display())]
    ArtifactCorrupt { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, PipelineError>;
