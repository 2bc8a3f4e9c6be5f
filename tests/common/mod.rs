//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use pipefit::config::Settings;

/// Convert string slices into owned labels
pub fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Create a small two-class DataFrame with a trailing label column
///
/// This DataFrame includes:
/// - `x1`: Clean numeric feature that separates the classes
/// - `x2`: Noise feature with two missing cells
/// - `label`: Binary target (0/1)
pub fn create_binary_dataframe() -> DataFrame {
    df! {
        "x1" => [1.0f64, 1.5, 2.0, 2.5, 3.0, 7.0, 7.5, 8.0, 8.5, 9.0],
        "x2" => [Some(5.0f64), None, Some(2.0), Some(9.0), Some(1.0),
                 Some(3.0), Some(7.0), None, Some(4.0), Some(6.0)],
        "label" => [0i32, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    }
    .unwrap()
}

/// Create a DataFrame with a text feature column (not usable as a feature)
pub fn create_text_feature_dataframe() -> DataFrame {
    df! {
        "x1" => [1.0f64, 2.0, 3.0, 4.0],
        "city" => ["a", "b", "c", "d"],
        "label" => ["yes", "no", "yes", "no"],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// YAML document pointing every artifact path inside `dir`
pub fn artifacts_yaml(dir: &Path) -> String {
    let artifacts = dir.join("artifacts");
    format!(
        "paths:\n  artifacts_path: {a}\n  model_path: {a}/model.bin\n  metrics_path: {a}/metrics.json\n  report_path: {a}/reports/report.json\n",
        a = artifacts.display()
    )
}

/// Write a configuration document into `dir` and return its path
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("train.yaml");
    std::fs::write(&path, contents).unwrap();
    path
}

/// Settings whose artifacts live under `dir` and whose data is bundled
pub fn temp_settings(dir: &Path) -> Settings {
    Settings::from_yaml_str(&artifacts_yaml(dir)).unwrap()
}
