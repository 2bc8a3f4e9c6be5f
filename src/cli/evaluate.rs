//! Evaluate entry point: score a previously trained pipeline on the test split

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use crate::artifacts::load_pipeline;
use crate::config::Settings;
use crate::error::PipelineError;
use crate::pipeline::load_split;
use crate::report::{classification_report, display_classification_report, export_report};
use crate::report::ClassificationReport;
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_step_header, print_success, print_value,
};

use super::print_data_source;

/// Result of an evaluation run
#[derive(Debug, Clone)]
pub enum EvaluateOutcome {
    /// The report was computed and written to `report_path`
    Completed {
        report: ClassificationReport,
        report_path: PathBuf,
    },
    /// No trained model exists yet; nothing was written
    ModelMissing { model_path: PathBuf },
}

/// Run the evaluation workflow with the configuration at `config_path`.
///
/// A missing model artifact is not an error: guidance is printed and
/// `EvaluateOutcome::ModelMissing` is returned.
pub fn run_evaluate(config_path: &Path) -> Result<EvaluateOutcome> {
    print_banner("evaluate", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(config_path)
        .with_context(|| format!("Failed to resolve configuration {}", config_path.display()))?;
    print_config(config_path, &settings);
    let paths = &settings.paths;

    // Step 1: Load data (only the test split is used)
    print_step_header(1, "Load Data");
    let spinner = create_spinner("Loading data...");
    let (split, source) = load_split(&settings).context("Failed to load evaluation data")?;
    finish_with_success(&spinner, "Data loaded");
    print_data_source(&source);
    print_value("Test rows", split.n_test());

    // Step 2: Load model
    print_step_header(2, "Load Model");
    let pipeline = match load_pipeline(&paths.model_path) {
        Ok(pipeline) => pipeline,
        Err(PipelineError::ArtifactNotFound { path }) => {
            println!(
                "    {} Model not found at {}. Please run {} first.",
                style("✗").red().bold(),
                path.display(),
                style("train").cyan().bold()
            );
            return Ok(EvaluateOutcome::ModelMissing { model_path: path });
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Failed to load model from {}", paths.model_path.display())
            })
        }
    };
    print_success(&format!("Loaded model from {}", paths.model_path.display()));

    // Step 3: Predict and report
    print_step_header(3, "Evaluate");
    let y_pred = pipeline
        .predict(&split.x_test)
        .context("Failed to predict on the test split")?;
    let report = classification_report(&split.y_test, &y_pred)
        .context("Failed to build the classification report")?;

    export_report(&report, &paths.report_path).with_context(|| {
        format!("Failed to write report to {}", paths.report_path.display())
    })?;
    print_success(&format!("Report saved to {}", paths.report_path.display()));

    display_classification_report(&report);
    print_completion("Evaluation complete!");

    Ok(EvaluateOutcome::Completed {
        report,
        report_path: paths.report_path.clone(),
    })
}
