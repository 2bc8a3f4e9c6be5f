//! pipefit: Tabular Classification Training Pipeline
//!
//! Loads a tabular dataset (falling back to a bundled Iris copy), fits an
//! imputation, clipping and scaling pipeline followed by multinomial
//! logistic regression, and persists the model together with metrics,
//! a classification report and a confusion matrix image.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;
