//! Preprocessing stages: median imputation, percentile clipping, standardization
//!
//! Every stage learns its parameters in `fit` and applies them unchanged in
//! `transform`, so statistics learned on the training split are reused as-is
//! on the test split and at inference time.

use serde::{Deserialize, Serialize};

use crate::config::PreprocessingSettings;
use crate::error::{PipelineError, Result};
use crate::pipeline::dataset::FeatureMatrix;

/// Unsupervised fit/transform contract shared by all preprocessing stages
pub trait Transformer {
    /// Human-readable type name used in error messages
    fn name(&self) -> &'static str;

    /// Learn parameters from `x`, replacing anything learned before
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()>;

    /// Apply the learned parameters to `x`
    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix>;

    fn is_fitted(&self) -> bool;

    /// Hyperparameters as `(name, value)` pairs
    fn params(&self) -> Vec<(String, String)>;

    fn fit_transform(&mut self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

fn ensure_non_empty(name: &str, x: &FeatureMatrix) -> Result<()> {
    if x.n_rows() == 0 {
        return Err(PipelineError::InvalidData(format!(
            "cannot fit {} on empty data",
            name
        )));
    }
    Ok(())
}

fn ensure_width(expected: usize, x: &FeatureMatrix) -> Result<()> {
    if x.n_cols() != expected {
        return Err(PipelineError::FeatureMismatch {
            expected,
            got: x.n_cols(),
        });
    }
    Ok(())
}

/// Non-NaN values of a column, sorted ascending
fn sorted_observed(x: &FeatureMatrix, col: usize) -> Vec<f64> {
    let mut values: Vec<f64> = x.column(col).into_iter().filter(|v| !v.is_nan()).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values
}

/// Percentile of sorted values with linear interpolation between order statistics
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Replaces NaN cells with the per-column median of the training data.
///
/// A column with no observed values imputes 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    statistics: Option<Vec<f64>>,
}

impl MedianImputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill values learned at fit time, one per column
    pub fn statistics(&self) -> Option<&[f64]> {
        self.statistics.as_deref()
    }
}

impl Transformer for MedianImputer {
    fn name(&self) -> &'static str {
        "MedianImputer"
    }

    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        ensure_non_empty(self.name(), x)?;
        let statistics = (0..x.n_cols())
            .map(|col| percentile(&sorted_observed(x, col), 50.0).unwrap_or(0.0))
            .collect();
        self.statistics = Some(statistics);
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let stats = self
            .statistics
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name().to_string()))?;
        ensure_width(stats.len(), x)?;
        Ok(x.map_cells(|col, v| if v.is_nan() { stats[col] } else { v }))
    }

    fn is_fitted(&self) -> bool {
        self.statistics.is_some()
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![("strategy".to_string(), "median".to_string())]
    }
}

/// Clips each column to percentile bounds learned from the training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileClipper {
    lower_percentile: f64,
    upper_percentile: f64,
    bounds: Option<Vec<(f64, f64)>>,
}

impl Default for PercentileClipper {
    fn default() -> Self {
        Self::new(1.0, 99.0)
    }
}

impl PercentileClipper {
    pub fn new(lower_percentile: f64, upper_percentile: f64) -> Self {
        Self {
            lower_percentile,
            upper_percentile,
            bounds: None,
        }
    }

    /// `(lower, upper)` limits per column, learned at fit time
    pub fn bounds(&self) -> Option<&[(f64, f64)]> {
        self.bounds.as_deref()
    }
}

impl Transformer for PercentileClipper {
    fn name(&self) -> &'static str {
        "PercentileClipper"
    }

    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        ensure_non_empty(self.name(), x)?;
        let bounds = (0..x.n_cols())
            .map(|col| {
                let sorted = sorted_observed(x, col);
                (
                    percentile(&sorted, self.lower_percentile).unwrap_or(f64::NEG_INFINITY),
                    percentile(&sorted, self.upper_percentile).unwrap_or(f64::INFINITY),
                )
            })
            .collect();
        self.bounds = Some(bounds);
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let bounds = self
            .bounds
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name().to_string()))?;
        ensure_width(bounds.len(), x)?;
        // NaN passes through unchanged
        Ok(x.map_cells(|col, v| {
            let (lo, hi) = bounds[col];
            if v < lo {
                lo
            } else if v > hi {
                hi
            } else {
                v
            }
        }))
    }

    fn is_fitted(&self) -> bool {
        self.bounds.is_some()
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            (
                "lower_percentile".to_string(),
                self.lower_percentile.to_string(),
            ),
            (
                "upper_percentile".to_string(),
                self.upper_percentile.to_string(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerState {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Standardizes columns to zero mean and unit variance.
///
/// Uses the population standard deviation; constant columns get scale 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    state: Option<ScalerState>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.mean.as_slice())
    }

    pub fn scale(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.scale.as_slice())
    }
}

impl Transformer for StandardScaler {
    fn name(&self) -> &'static str {
        "StandardScaler"
    }

    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        ensure_non_empty(self.name(), x)?;
        let mut mean = Vec::with_capacity(x.n_cols());
        let mut scale = Vec::with_capacity(x.n_cols());

        for col in 0..x.n_cols() {
            let values: Vec<f64> = x.column(col).into_iter().filter(|v| !v.is_nan()).collect();
            if values.is_empty() {
                mean.push(0.0);
                scale.push(1.0);
                continue;
            }
            let n = values.len() as f64;
            let m = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            mean.push(m);
            scale.push(if std > f64::EPSILON { std } else { 1.0 });
        }

        self.state = Some(ScalerState { mean, scale });
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.name().to_string()))?;
        ensure_width(state.mean.len(), x)?;
        Ok(x.map_cells(|col, v| (v - state.mean[col]) / state.scale[col]))
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("with_mean".to_string(), "true".to_string()),
            ("with_std".to_string(), "true".to_string()),
        ]
    }
}

/// One preprocessing step of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    Imputer(MedianImputer),
    Clipper(PercentileClipper),
    Scaler(StandardScaler),
}

impl Stage {
    fn inner(&self) -> &dyn Transformer {
        match self {
            Stage::Imputer(t) => t,
            Stage::Clipper(t) => t,
            Stage::Scaler(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Transformer {
        match self {
            Stage::Imputer(t) => t,
            Stage::Clipper(t) => t,
            Stage::Scaler(t) => t,
        }
    }
}

impl Transformer for Stage {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        self.inner_mut().fit(x)
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.inner().transform(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn params(&self) -> Vec<(String, String)> {
        self.inner().params()
    }
}

/// Build the unfitted preprocessing chain: imputer, optional clipper, scaler
pub fn build_preprocessing(settings: &PreprocessingSettings) -> Vec<(String, Stage)> {
    let mut steps = vec![("imputer".to_string(), Stage::Imputer(MedianImputer::new()))];
    if settings.clip_outliers {
        steps.push((
            "clipper".to_string(),
            Stage::Clipper(PercentileClipper::new(
                settings.lower_percentile,
                settings.upper_percentile,
            )),
        ));
    }
    steps.push(("scaler".to_string(), Stage::Scaler(StandardScaler::new())));
    steps
}
