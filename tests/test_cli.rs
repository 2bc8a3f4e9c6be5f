//! Tests for CLI argument parsing and the train/evaluate binaries

use assert_cmd::Command;
use clap::Parser;
use pipefit::cli::Cli;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_cli_default_config_path() {
    let cli = Cli::parse_from(["train"]);
    assert_eq!(cli.config, PathBuf::from("config/train.yaml"));
}

#[test]
fn test_cli_custom_config_path() {
    let cli = Cli::parse_from(["train", "--config", "experiments/a.yaml"]);
    assert_eq!(cli.config, PathBuf::from("experiments/a.yaml"));

    let cli = Cli::parse_from(["evaluate", "-c", "b.yaml"]);
    assert_eq!(cli.config, PathBuf::from("b.yaml"));
}

#[test]
fn test_train_binary_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    Command::cargo_bin("train")
        .unwrap()
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_binaries_train_then_evaluate() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("config")).unwrap();
    std::fs::write(
        temp_dir.path().join("config/train.yaml"),
        "data:\n  test_size: 0.2\n",
    )
    .unwrap();

    Command::cargo_bin("train")
        .unwrap()
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Training complete"));

    let artifacts = temp_dir.path().join("artifacts");
    assert!(artifacts.join("model.bin").is_file());
    assert!(artifacts.join("metrics.json").is_file());
    assert!(artifacts.join("confusion_matrix.png").is_file());

    Command::cargo_bin("evaluate")
        .unwrap()
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluation complete"));

    assert!(artifacts.join("report.json").is_file());
}

#[test]
fn test_evaluate_binary_without_model_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &artifacts_yaml(temp_dir.path()));

    Command::cargo_bin("evaluate")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Please run"));

    assert!(!temp_dir.path().join("artifacts/reports/report.json").exists());
}
