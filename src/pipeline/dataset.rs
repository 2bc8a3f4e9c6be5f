//! In-memory feature matrix and labelled dataset

use crate::error::{PipelineError, Result};

/// Dense row-major feature matrix. Missing cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from row-major values
    pub fn new(columns: Vec<String>, rows: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * columns.len() {
            return Err(PipelineError::InvalidData(format!(
                "expected {} values for {} rows x {} columns, got {}",
                rows * columns.len(),
                rows,
                columns.len(),
                data.len()
            )));
        }
        Ok(Self {
            columns,
            rows,
            data,
        })
    }

    /// Build a matrix from a list of rows, naming columns `x0`, `x1`, ...
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(PipelineError::InvalidData(format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                n_cols
            )));
        }
        let columns = (0..n_cols).map(|i| format!("x{}", i)).collect();
        let data = rows.iter().flatten().copied().collect();
        Self::new(columns, rows.len(), data)
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw row-major values
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols() + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let n_cols = self.n_cols();
        &self.data[row * n_cols..(row + 1) * n_cols]
    }

    /// Values of one column, in row order
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// New matrix with the same columns and the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let data = indices
            .iter()
            .flat_map(|&row| self.row(row).iter().copied())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows: indices.len(),
            data,
        }
    }

    /// Apply `f(col, value)` to every cell, producing a new matrix
    pub fn map_cells<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, f64) -> f64,
    {
        let n_cols = self.n_cols();
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| f(i % n_cols, v))
            .collect();
        Self {
            columns: self.columns.clone(),
            rows: self.rows,
            data,
        }
    }

    /// Number of NaN cells
    pub fn missing_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }
}

/// Feature matrix with one label per row
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: FeatureMatrix,
    pub labels: Vec<String>,
    /// Name of the label column in the source
    pub target_name: String,
}

impl Dataset {
    /// Pair features with labels, rejecting row count divergence
    pub fn new(features: FeatureMatrix, labels: Vec<String>, target_name: String) -> Result<Self> {
        if features.n_rows() != labels.len() {
            return Err(PipelineError::InvalidData(format!(
                "feature matrix has {} rows but {} labels",
                features.n_rows(),
                labels.len()
            )));
        }
        Ok(Self {
            features,
            labels,
            target_name,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Distinct labels in a stable order: numeric order when every label parses
/// as a number, lexicographic otherwise
pub fn sorted_unique_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut unique: Vec<String> = labels.into_iter().cloned().collect();
    unique.sort();
    unique.dedup();

    let numeric: Option<Vec<f64>> = unique.iter().map(|l| l.trim().parse::<f64>().ok()).collect();
    if let Some(values) = numeric {
        let mut paired: Vec<(f64, String)> = values.into_iter().zip(unique).collect();
        paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        return paired.into_iter().map(|(_, l)| l).collect();
    }
    unique
}
