//! Bundled reference dataset (Fisher's Iris, 150 rows, 3 classes)

use std::io::Cursor;

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::loader::dataframe_to_dataset;

const IRIS_CSV: &str = include_str!("../../data/iris.csv");

/// Number of rows in the bundled dataset
pub const BUNDLED_ROWS: usize = 150;

/// Parse the bundled Iris dataset. Labels are `0`, `1`, `2`.
pub fn load_bundled_dataset() -> Result<Dataset> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(IRIS_CSV.as_bytes()))
        .finish()
        .map_err(|e| {
            PipelineError::DataNotFound(format!("bundled dataset could not be parsed: {}", e))
        })?;

    dataframe_to_dataset(&df).map_err(|e| {
        PipelineError::DataNotFound(format!("bundled dataset is unusable: {}", e))
    })
}
