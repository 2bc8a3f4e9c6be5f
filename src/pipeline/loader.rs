//! Dataset loader for CSV and Parquet files
//!
//! A data file holds feature columns followed by exactly one label column.
//! When no usable file is configured the bundled Iris dataset is used.

use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::config::Settings;
use crate::error::{PipelineError, Result};
use crate::pipeline::bundled::load_bundled_dataset;
use crate::pipeline::dataset::{Dataset, FeatureMatrix};
use crate::pipeline::split::{train_test_split, Split};

/// Rows used for CSV schema inference
const INFER_SCHEMA_LENGTH: usize = 10_000;

/// Where the loaded dataset came from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// The configured data file
    File(PathBuf),
    /// The bundled dataset; `requested` is a configured path that did not exist
    Bundled { requested: Option<PathBuf> },
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Bundled { .. } => write!(f, "bundled Iris dataset"),
        }
    }
}

/// Load a data file into a DataFrame (CSV or Parquet based on extension)
pub fn load_dataframe(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" | "txt" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_LENGTH))
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
        _ => {
            return Err(PipelineError::InvalidData(format!(
                "Unsupported file format: {}. Supported formats: csv, parquet",
                extension
            )))
        }
    };

    Ok(lf.collect()?)
}

/// Split a DataFrame into numeric features (all but the last column) and
/// string labels (the last column)
pub fn dataframe_to_dataset(df: &DataFrame) -> Result<Dataset> {
    let columns = df.get_columns();
    if columns.len() < 2 {
        return Err(PipelineError::InvalidData(format!(
            "expected at least one feature column and one label column, found {} column(s)",
            columns.len()
        )));
    }

    let (feature_cols, label_col) = columns.split_at(columns.len() - 1);
    let label_col = &label_col[0];
    let rows = df.height();

    let mut per_column: Vec<Vec<f64>> = Vec::with_capacity(feature_cols.len());
    let mut names = Vec::with_capacity(feature_cols.len());
    for col in feature_cols {
        per_column.push(numeric_values(col)?);
        names.push(col.name().to_string());
    }

    // Transpose the column vectors into row-major storage
    let mut data = Vec::with_capacity(rows * feature_cols.len());
    for row in 0..rows {
        for values in &per_column {
            data.push(values[row]);
        }
    }

    let label_strings = label_col.cast(&DataType::String)?;
    let labels = label_strings
        .str()?
        .iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(|s| s.to_string()).ok_or_else(|| {
                PipelineError::InvalidData(format!(
                    "label column '{}' has a missing value at row {}",
                    label_col.name(),
                    row
                ))
            })
        })
        .collect::<Result<Vec<String>>>()?;

    Dataset::new(
        FeatureMatrix::new(names, rows, data)?,
        labels,
        label_col.name().to_string(),
    )
}

/// Extract a feature column as f64, mapping nulls to NaN
fn numeric_values(col: &Column) -> Result<Vec<f64>> {
    let all_null = col.null_count() == col.len();
    if !(col.dtype().is_primitive_numeric() || all_null) {
        return Err(PipelineError::InvalidData(format!(
            "feature column '{}' must be numeric, found {}",
            col.name(),
            col.dtype()
        )));
    }

    if all_null {
        return Ok(vec![f64::NAN; col.len()]);
    }

    let float_col = col.cast(&DataType::Float64)?;
    let values = float_col
        .f64()?
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Load the configured data file, or fall back to the bundled dataset
pub fn load_source_dataset(settings: &Settings) -> Result<(Dataset, DataSource)> {
    match &settings.paths.data_path {
        Some(path) if path.exists() => {
            let df = load_dataframe(path)?;
            Ok((dataframe_to_dataset(&df)?, DataSource::File(path.clone())))
        }
        requested => {
            if requested.is_some() && !settings.data.fallback_to_bundled {
                return Err(PipelineError::DataNotFound(format!(
                    "data file {} does not exist and fallback to the bundled dataset is disabled",
                    requested
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )));
            }
            Ok((
                load_bundled_dataset()?,
                DataSource::Bundled {
                    requested: requested.clone(),
                },
            ))
        }
    }
}

/// Load the dataset and split it with the configured seed and test fraction
pub fn load_split(settings: &Settings) -> Result<(Split, DataSource)> {
    let (dataset, source) = load_source_dataset(settings)?;
    let split = train_test_split(&dataset, settings.data.test_size, settings.data.random_state)?;
    Ok((split, source))
}
