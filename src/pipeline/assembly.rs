//! Full pipeline: preprocessing stages followed by the classifier

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{PipelineError, Result};
use crate::pipeline::dataset::FeatureMatrix;
use crate::pipeline::model::{build_model, LogisticRegression};
use crate::pipeline::preprocessing::{build_preprocessing, Stage, Transformer};

/// Name of the terminal classifier step
pub const MODEL_STEP: &str = "model";

/// Ordered named transform stages terminated by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    steps: Vec<(String, Stage)>,
    model: LogisticRegression,
}

impl Pipeline {
    pub fn new(steps: Vec<(String, Stage)>, model: LogisticRegression) -> Self {
        Self { steps, model }
    }

    /// Fit every stage left to right, each on the previous stage's output.
    /// Only the classifier sees the labels.
    pub fn fit(&mut self, x: &FeatureMatrix, y: &[String]) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(PipelineError::FitFailure(format!(
                "found input with {} rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }

        let mut current = x.clone();
        for (_, stage) in self.steps.iter_mut() {
            current = stage.fit_transform(&current)?;
        }
        self.model.fit(&current, y)
    }

    /// Run all fitted transform stages on `x`
    pub fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let mut current = x.clone();
        for (_, stage) in &self.steps {
            current = stage.transform(&current)?;
        }
        Ok(current)
    }

    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
        self.ensure_fitted()?;
        self.model.predict(&self.transform(x)?)
    }

    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        self.ensure_fitted()?;
        self.model.predict_proba(&self.transform(x)?)
    }

    fn ensure_fitted(&self) -> Result<()> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(PipelineError::NotFitted("Pipeline".to_string()))
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_fitted() && self.steps.iter().all(|(_, s)| s.is_fitted())
    }

    /// Step names in execution order, ending with [`MODEL_STEP`]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(std::iter::once(MODEL_STEP))
            .collect()
    }

    /// Class labels seen during fit
    pub fn classes(&self) -> Option<&[String]> {
        self.model.classes()
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    /// Hyperparameters of every step, keyed `step__param`
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("steps".to_string(), self.step_names().join(","));

        let step_params = self
            .steps
            .iter()
            .map(|(name, stage)| (name.as_str(), stage.params()))
            .chain(std::iter::once((MODEL_STEP, self.model.params())));
        for (step, values) in step_params {
            for (key, value) in values {
                params.insert(format!("{}__{}", step, key), value);
            }
        }
        params
    }
}

/// Assemble the unfitted pipeline described by `settings`
pub fn build_pipeline(settings: &Settings) -> Pipeline {
    Pipeline::new(
        build_preprocessing(&settings.preprocessing),
        build_model(&settings.model),
    )
}
