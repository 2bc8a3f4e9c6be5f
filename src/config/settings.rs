//! Training configuration: raw YAML schema and resolved settings
//!
//! The YAML document is deserialized into an all-optional raw layer and then
//! resolved once into [`Settings`], which carries a concrete value for every
//! field. Downstream components only ever see `Settings`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Conventional location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "config/train.yaml";

/// File name of the confusion matrix image inside the artifacts directory.
pub const CONFUSION_MATRIX_FILE: &str = "confusion_matrix.png";

const DEFAULT_ARTIFACTS_PATH: &str = "artifacts/";
const DEFAULT_MODEL_FILE: &str = "model.bin";
const DEFAULT_METRICS_FILE: &str = "metrics.json";
const DEFAULT_REPORT_FILE: &str = "report.json";

const DEFAULT_TEST_SIZE: f64 = 0.2;
const DEFAULT_RANDOM_STATE: u64 = 42;
const DEFAULT_MAX_ITER: usize = 1000;
const DEFAULT_C: f64 = 1.0;
const DEFAULT_TOL: f64 = 1e-4;
const DEFAULT_LOWER_PERCENTILE: f64 = 1.0;
const DEFAULT_UPPER_PERCENTILE: f64 = 99.0;

// Raw document layer. Every field is optional and unknown keys are ignored,
// so one document can be shared by experiments with other model families.

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    paths: Option<RawPaths>,
    data: Option<RawData>,
    preprocessing: Option<RawPreprocessing>,
    model: Option<RawModel>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPaths {
    data_path: Option<PathBuf>,
    artifacts_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    metrics_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    test_size: Option<f64>,
    random_state: Option<u64>,
    fallback_to_bundled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPreprocessing {
    clip_outliers: Option<bool>,
    lower_percentile: Option<f64>,
    upper_percentile: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawModel {
    params: Option<RawModelParams>,
}

#[derive(Debug, Default, Deserialize)]
struct RawModelParams {
    random_state: Option<u64>,
    max_iter: Option<usize>,
    #[serde(alias = "C")]
    c: Option<f64>,
    tol: Option<f64>,
}

/// Filesystem locations for inputs and artifacts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSettings {
    /// Optional data file; `None` selects the bundled dataset
    pub data_path: Option<PathBuf>,
    pub artifacts_path: PathBuf,
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
}

impl PathSettings {
    /// Location of the confusion matrix image (fixed name in the artifacts dir)
    pub fn confusion_matrix_path(&self) -> PathBuf {
        self.artifacts_path.join(CONFUSION_MATRIX_FILE)
    }
}

/// Dataset split settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSettings {
    /// Fraction of rows held out for testing, in (0, 1)
    pub test_size: f64,
    /// Seed for the train/test shuffle
    pub random_state: u64,
    /// Use the bundled dataset when the configured data file is missing
    pub fallback_to_bundled: bool,
}

/// Preprocessing chain settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessingSettings {
    /// Insert the percentile clipping stage between imputation and scaling
    pub clip_outliers: bool,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
}

/// Logistic regression hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSettings {
    pub random_state: u64,
    pub max_iter: usize,
    /// Inverse L2 regularization strength
    pub c: f64,
    /// Gradient tolerance for the stopping criterion
    pub tol: f64,
}

/// Fully resolved, immutable workflow settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub paths: PathSettings,
    pub data: DataSettings,
    pub preprocessing: PreprocessingSettings,
    pub model: ModelSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

impl Settings {
    /// Read and resolve the configuration document at `path`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            PipelineError::ConfigParse { message, .. } => PipelineError::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Resolve settings from YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = if contents.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str::<Option<RawConfig>>(contents)
                .map_err(|e| PipelineError::ConfigParse {
                    path: PathBuf::new(),
                    message: e.to_string(),
                })?
                .unwrap_or_default()
        };

        Self::resolve(raw)
    }

    fn resolve(raw: RawConfig) -> Result<Self> {
        let settings = Self::from_raw(raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Fill every missing field with its default, without validation
    fn from_raw(raw: RawConfig) -> Self {
        let paths = raw.paths.unwrap_or_default();
        let data = raw.data.unwrap_or_default();
        let preprocessing = raw.preprocessing.unwrap_or_default();
        let params = raw.model.and_then(|m| m.params).unwrap_or_default();

        let artifacts_path = paths
            .artifacts_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_PATH));

        Settings {
            paths: PathSettings {
                data_path: paths.data_path.filter(|p| !p.as_os_str().is_empty()),
                model_path: paths
                    .model_path
                    .unwrap_or_else(|| artifacts_path.join(DEFAULT_MODEL_FILE)),
                metrics_path: paths
                    .metrics_path
                    .unwrap_or_else(|| artifacts_path.join(DEFAULT_METRICS_FILE)),
                report_path: paths
                    .report_path
                    .unwrap_or_else(|| artifacts_path.join(DEFAULT_REPORT_FILE)),
                artifacts_path,
            },
            data: DataSettings {
                test_size: data.test_size.unwrap_or(DEFAULT_TEST_SIZE),
                random_state: data.random_state.unwrap_or(DEFAULT_RANDOM_STATE),
                fallback_to_bundled: data.fallback_to_bundled.unwrap_or(true),
            },
            preprocessing: PreprocessingSettings {
                clip_outliers: preprocessing.clip_outliers.unwrap_or(false),
                lower_percentile: preprocessing
                    .lower_percentile
                    .unwrap_or(DEFAULT_LOWER_PERCENTILE),
                upper_percentile: preprocessing
                    .upper_percentile
                    .unwrap_or(DEFAULT_UPPER_PERCENTILE),
            },
            model: ModelSettings {
                random_state: params.random_state.unwrap_or(DEFAULT_RANDOM_STATE),
                max_iter: params.max_iter.unwrap_or(DEFAULT_MAX_ITER),
                c: params.c.unwrap_or(DEFAULT_C),
                tol: params.tol.unwrap_or(DEFAULT_TOL),
            },
        }
    }

    /// Check value ranges and that every artifact path is non-empty
    pub fn validate(&self) -> Result<()> {
        for (field, path) in [
            ("paths.artifacts_path", &self.paths.artifacts_path),
            ("paths.model_path", &self.paths.model_path),
            ("paths.metrics_path", &self.paths.metrics_path),
            ("paths.report_path", &self.paths.report_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(invalid(field, "path must not be empty"));
            }
        }

        let test_size = self.data.test_size;
        if !(test_size.is_finite() && test_size > 0.0 && test_size < 1.0) {
            return Err(invalid(
                "data.test_size",
                &format!("must be between 0.0 and 1.0 (exclusive), got {}", test_size),
            ));
        }

        let (lower, upper) = (
            self.preprocessing.lower_percentile,
            self.preprocessing.upper_percentile,
        );
        if !(0.0..=100.0).contains(&lower) || !(0.0..=100.0).contains(&upper) || lower >= upper {
            return Err(invalid(
                "preprocessing.lower_percentile/upper_percentile",
                &format!(
                    "expected 0 <= lower < upper <= 100, got lower={}, upper={}",
                    lower, upper
                ),
            ));
        }

        if self.model.max_iter == 0 {
            return Err(invalid("model.params.max_iter", "must be at least 1"));
        }
        if !(self.model.c.is_finite() && self.model.c > 0.0) {
            return Err(invalid(
                "model.params.c",
                &format!("must be a positive number, got {}", self.model.c),
            ));
        }
        if !(self.model.tol.is_finite() && self.model.tol > 0.0) {
            return Err(invalid(
                "model.params.tol",
                &format!("must be a positive number, got {}", self.model.tol),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> PipelineError {
    PipelineError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_resolves_to_defaults() {
        let settings = Settings::from_yaml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.paths.artifacts_path, PathBuf::from("artifacts/"));
        assert_eq!(settings.paths.model_path, PathBuf::from("artifacts/model.bin"));
        assert_eq!(settings.data.test_size, 0.2);
        assert_eq!(settings.data.random_state, 42);
        assert_eq!(settings.model.max_iter, 1000);
        assert!(!settings.preprocessing.clip_outliers);
        assert!(settings.paths.data_path.is_none());
    }

    #[test]
    fn test_default_settings_pass_validation() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_directory_is_config_not_found() {
        let dir = std::env::temp_dir();
        let err = Settings::load(&dir).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_derived_paths_follow_artifacts_path() {
        let settings = Settings::from_yaml_str("paths:\n  artifacts_path: out\n").unwrap();
        assert_eq!(settings.paths.model_path, PathBuf::from("out/model.bin"));
        assert_eq!(settings.paths.metrics_path, PathBuf::from("out/metrics.json"));
        assert_eq!(settings.paths.report_path, PathBuf::from("out/report.json"));
        assert_eq!(
            settings.paths.confusion_matrix_path(),
            PathBuf::from("out/confusion_matrix.png")
        );
    }

    #[test]
    fn test_null_sections_use_defaults() {
        let settings = Settings::from_yaml_str("paths:\ndata:\nmodel:\n").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_empty_data_path_means_bundled() {
        let settings = Settings::from_yaml_str("paths:\n  data_path: \"\"\n").unwrap();
        assert!(settings.paths.data_path.is_none());
    }

    #[test]
    fn test_uppercase_c_alias() {
        let settings = Settings::from_yaml_str("model:\n  params:\n    C: 0.5\n").unwrap();
        assert_eq!(settings.model.c, 0.5);
    }

    #[test]
    fn test_zero_max_iter_rejected() {
        let err = Settings::from_yaml_str("model:\n  params:\n    max_iter: 0\n").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
    }
}
