//! Seeded train/test partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PipelineError, Result};
use crate::pipeline::dataset::{Dataset, FeatureMatrix};

/// Train/test partition of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Vec<String>,
    pub y_test: Vec<String>,
    /// Source row indices of the training rows, in split order
    pub train_indices: Vec<usize>,
    /// Source row indices of the test rows, in split order
    pub test_indices: Vec<usize>,
}

impl Split {
    pub fn n_train(&self) -> usize {
        self.y_train.len()
    }

    pub fn n_test(&self) -> usize {
        self.y_test.len()
    }
}

/// Number of test rows for a given fraction: `ceil(test_size * n)`
pub fn test_row_count(n_rows: usize, test_size: f64) -> usize {
    (test_size * n_rows as f64).ceil() as usize
}

/// Shuffle row indices once with `random_state` and take the first
/// `ceil(test_size * n)` as the test set.
///
/// The same dataset, fraction and seed always produce the same split.
pub fn train_test_split(dataset: &Dataset, test_size: f64, random_state: u64) -> Result<Split> {
    let n_rows = dataset.len();
    let n_test = test_row_count(n_rows, test_size);
    let n_train = n_rows.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(PipelineError::InvalidData(format!(
            "test_size={} on {} rows leaves {} train and {} test rows; both must be non-empty",
            test_size, n_rows, n_train, n_test
        )));
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(n_test);
    let pick = |idx: &[usize]| -> Vec<String> {
        idx.iter().map(|&i| dataset.labels[i].clone()).collect()
    };

    Ok(Split {
        x_train: dataset.features.select_rows(train_indices),
        x_test: dataset.features.select_rows(test_indices),
        y_train: pick(train_indices),
        y_test: pick(test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}
