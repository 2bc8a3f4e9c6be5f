//! Train entry point: fit the pipeline and write model, metrics and plot

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use crate::artifacts::{ensure_dir, save_pipeline};
use crate::config::Settings;
use crate::pipeline::{build_pipeline, load_split, sorted_unique_labels};
use crate::report::{
    accuracy_score, confusion_matrix, display_training_metrics, export_metrics, f1_macro,
    save_confusion_matrix, TrainingMetrics,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_step_header, print_success, print_value,
};

use super::print_data_source;

/// Files written by a successful training run
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub metrics: TrainingMetrics,
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
    pub confusion_matrix_path: PathBuf,
}

/// Run the full training workflow with the configuration at `config_path`.
///
/// Steps run in order and the first failure aborts the rest, so no metrics
/// are written for a pipeline that failed to fit.
pub fn run_train(config_path: &Path) -> Result<TrainOutcome> {
    let started = Instant::now();
    print_banner("train", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(config_path)
        .with_context(|| format!("Failed to resolve configuration {}", config_path.display()))?;
    print_config(config_path, &settings);

    // Step 1: Load data
    print_step_header(1, "Load Data");
    let spinner = create_spinner("Loading data...");
    let (split, source) = load_split(&settings).context("Failed to load training data")?;
    finish_with_success(&spinner, "Data loaded");
    print_data_source(&source);
    print_value("Train rows", split.n_train());
    print_value("Test rows", split.n_test());
    print_value("Features", split.x_train.n_cols());

    // Step 2: Fit
    print_step_header(2, "Preprocess & Train");
    ensure_dir(&settings.paths.artifacts_path).with_context(|| {
        format!(
            "Artifacts directory {} is not writable",
            settings.paths.artifacts_path.display()
        )
    })?;

    let mut pipeline = build_pipeline(&settings);
    println!(
        "      Steps: {}",
        style(pipeline.step_names().join(" → ")).dim()
    );
    let spinner = create_spinner("Fitting pipeline...");
    pipeline
        .fit(&split.x_train, &split.y_train)
        .context("Failed to fit pipeline")?;

    let n_iter = pipeline.model().n_iter().unwrap_or(0);
    let converged = pipeline.model().converged().unwrap_or(false);
    if converged {
        finish_with_success(
            &spinner,
            &format!("Pipeline fitted ({} iterations)", n_iter),
        );
    } else {
        finish_with_warning(
            &spinner,
            &format!(
                "Solver did not converge within max_iter={}; consider increasing it",
                pipeline.model().max_iter()
            ),
        );
    }

    // Step 3: Evaluate on the held-out split
    print_step_header(3, "Evaluate");
    let y_pred = pipeline
        .predict(&split.x_test)
        .context("Failed to predict on the test split")?;
    let accuracy = accuracy_score(&split.y_test, &y_pred)?;
    let f1 = f1_macro(&split.y_test, &y_pred)?;
    print_value("Accuracy", format!("{:.4}", accuracy));
    print_value("F1-macro", format!("{:.4}", f1));

    // Step 4: Persist artifacts
    print_step_header(4, "Save Artifacts");
    let paths = &settings.paths;

    save_pipeline(&pipeline, &paths.model_path)
        .with_context(|| format!("Failed to save model to {}", paths.model_path.display()))?;
    print_success(&format!("Full pipeline saved to {}", paths.model_path.display()));

    let metrics = TrainingMetrics::new(
        accuracy,
        f1,
        split.n_train(),
        split.n_test(),
        converged,
        n_iter,
    );
    export_metrics(&metrics, &paths.metrics_path).with_context(|| {
        format!("Failed to write metrics to {}", paths.metrics_path.display())
    })?;
    print_success(&format!("Metrics saved to {}", paths.metrics_path.display()));

    let cm_path = paths.confusion_matrix_path();
    let labels = sorted_unique_labels(
        split
            .y_test
            .iter()
            .chain(&y_pred)
            .chain(pipeline.classes().unwrap_or_default()),
    );
    let cm = confusion_matrix(&split.y_test, &y_pred, Some(&labels))?;
    save_confusion_matrix(&cm, &cm_path).with_context(|| {
        format!("Failed to write confusion matrix to {}", cm_path.display())
    })?;
    print_success(&format!("Confusion matrix saved to {}", cm_path.display()));

    display_training_metrics(&metrics);
    print_completion(&format!(
        "Training complete in {:.2}s",
        started.elapsed().as_secs_f64()
    ));

    Ok(TrainOutcome {
        metrics,
        model_path: paths.model_path.clone(),
        metrics_path: paths.metrics_path.clone(),
        confusion_matrix_path: cm_path,
    })
}
