//! JSON export of training metrics and evaluation reports

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::artifacts::ensure_parent_dir;
use crate::error::Result;
use crate::report::ClassificationReport;

/// Metrics document written by the trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Test-split accuracy
    pub accuracy: f64,
    /// Test-split macro-averaged F1
    pub f1_macro: f64,
    pub n_train: usize,
    pub n_test: usize,
    /// Whether the classifier reached its gradient tolerance
    pub converged: bool,
    pub n_iter: usize,
    /// Timestamp of the run (RFC 3339)
    pub generated_at: String,
}

impl TrainingMetrics {
    pub fn new(
        accuracy: f64,
        f1_macro: f64,
        n_train: usize,
        n_test: usize,
        converged: bool,
        n_iter: usize,
    ) -> Self {
        Self {
            accuracy,
            f1_macro,
            n_train,
            n_test,
            converged,
            n_iter,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Write any serializable value as pretty JSON, creating parent directories
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn export_metrics(metrics: &TrainingMetrics, path: &Path) -> Result<()> {
    write_json(metrics, path)
}

/// Write the classification report as `{label: {...}, "accuracy": ..., ...}`
pub fn export_report(report: &ClassificationReport, path: &Path) -> Result<()> {
    write_json(report, path)
}
