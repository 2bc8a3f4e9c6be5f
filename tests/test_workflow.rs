//! End-to-end tests for the train and evaluate entry points

use pipefit::artifacts::load_pipeline;
use pipefit::cli::{run_evaluate, run_train, EvaluateOutcome};
use pipefit::report::TrainingMetrics;
use serde_json::Value;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_train_then_evaluate_on_bundled_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &artifacts_yaml(temp_dir.path()));
    let settings = temp_settings(temp_dir.path());

    let outcome = run_train(&config).unwrap();

    assert!(outcome.model_path.is_file());
    assert!(outcome.metrics_path.is_file());
    assert!(outcome.confusion_matrix_path.is_file());
    assert_eq!(outcome.model_path, settings.paths.model_path);
    assert_eq!(
        outcome.confusion_matrix_path,
        settings.paths.confusion_matrix_path()
    );

    let metrics: TrainingMetrics =
        serde_json::from_str(&std::fs::read_to_string(&outcome.metrics_path).unwrap()).unwrap();
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!((0.0..=1.0).contains(&metrics.f1_macro));
    assert_eq!(metrics.n_train + metrics.n_test, 150);
    assert_eq!(metrics.n_test, 30);

    let loaded = load_pipeline(&outcome.model_path).unwrap();
    assert!(loaded.is_fitted());

    match run_evaluate(&config).unwrap() {
        EvaluateOutcome::Completed {
            report,
            report_path,
        } => {
            assert_eq!(report_path, settings.paths.report_path);
            assert_eq!(report.per_class.len(), 3);

            let json: Value =
                serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
            for class in ["0", "1", "2"] {
                assert!(json[class].is_object(), "report is missing class {}", class);
            }
            assert!((report.accuracy - metrics.accuracy).abs() < 1e-12);
        }
        other => panic!("expected a completed evaluation, got {:?}", other),
    }
}

#[test]
fn test_evaluate_without_model_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &artifacts_yaml(temp_dir.path()));
    let settings = temp_settings(temp_dir.path());

    match run_evaluate(&config).unwrap() {
        EvaluateOutcome::ModelMissing { model_path } => {
            assert_eq!(model_path, settings.paths.model_path);
        }
        other => panic!("expected ModelMissing, got {:?}", other),
    }
    assert!(!settings.paths.report_path.exists());
}

#[test]
fn test_train_is_repeatable() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &artifacts_yaml(temp_dir.path()));

    let first = run_train(&config).unwrap();
    let first_model = load_pipeline(&first.model_path).unwrap();
    let second = run_train(&config).unwrap();
    let second_model = load_pipeline(&second.model_path).unwrap();

    assert_eq!(first.metrics.accuracy, second.metrics.accuracy);
    assert_eq!(first_model, second_model);
}

#[test]
fn test_train_with_user_data_file() {
    let mut df = create_binary_dataframe();
    let (data_dir, csv_path) = create_temp_csv(&mut df);
    let yaml = format!(
        "{}  data_path: {}\ndata:\n  test_size: 0.3\n",
        artifacts_yaml(data_dir.path()),
        csv_path.display()
    );
    let config = write_config(data_dir.path(), &yaml);

    let outcome = run_train(&config).unwrap();
    assert_eq!(outcome.metrics.n_test, 3);
    assert_eq!(outcome.metrics.n_train, 7);
    assert!(outcome.confusion_matrix_path.is_file());
}

#[test]
fn test_train_with_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let err = run_train(&temp_dir.path().join("nope.yaml")).unwrap_err();
    assert!(format!("{:#}", err).contains("Configuration file not found"));
}

#[test]
fn test_train_fails_without_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let yaml = format!(
        "{}  data_path: {}\ndata:\n  fallback_to_bundled: false\n",
        artifacts_yaml(temp_dir.path()),
        temp_dir.path().join("missing.csv").display()
    );
    let config = write_config(temp_dir.path(), &yaml);
    let settings = temp_settings(temp_dir.path());

    assert!(run_train(&config).is_err());
    assert!(!settings.paths.metrics_path.exists());
    assert!(!settings.paths.model_path.exists());
}
