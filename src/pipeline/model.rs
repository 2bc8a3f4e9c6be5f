//! Multinomial logistic regression classifier
//!
//! Minimizes mean softmax cross-entropy with an L2 penalty of
//! `||W||^2 / (2 * C * n)` on the feature weights (intercepts are not
//! penalized) using Nesterov-accelerated gradient descent. The step size is
//! `1 / L` for the curvature bound `L = 0.5 * ||X||_F^2 / n + 1 / (C * n)`.

use faer::Mat;
use serde::{Deserialize, Serialize};

use crate::config::ModelSettings;
use crate::error::{PipelineError, Result};
use crate::pipeline::dataset::{sorted_unique_labels, FeatureMatrix};

/// Learned coefficients of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedLogistic {
    classes: Vec<String>,
    n_features: usize,
    /// `(n_features + 1) x n_classes`, row-major; the last row holds intercepts
    coef: Vec<f64>,
    n_iter: usize,
    converged: bool,
}

/// Logistic regression hyperparameters plus (after `fit`) learned weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    random_state: u64,
    max_iter: usize,
    c: f64,
    tol: f64,
    fitted: Option<FittedLogistic>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(42, 1000, 1.0, 1e-4)
    }
}

impl LogisticRegression {
    pub fn new(random_state: u64, max_iter: usize, c: f64, tol: f64) -> Self {
        Self {
            random_state,
            max_iter,
            c,
            tol,
            fitted: None,
        }
    }

    /// Fit on features `x` and one label per row of `x`
    pub fn fit(&mut self, x: &FeatureMatrix, y: &[String]) -> Result<()> {
        let n = x.n_rows();
        let d = x.n_cols();

        if n == 0 {
            return Err(PipelineError::FitFailure(
                "cannot fit LogisticRegression on empty data".to_string(),
            ));
        }
        if y.len() != n {
            return Err(PipelineError::FitFailure(format!(
                "found input with {} rows but {} labels",
                n,
                y.len()
            )));
        }
        if x.values().iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::FitFailure(
                "input contains NaN or infinite values".to_string(),
            ));
        }

        let classes = sorted_unique_labels(y);
        let k = classes.len();
        if k < 2 {
            return Err(PipelineError::FitFailure(format!(
                "needs samples of at least 2 classes, got {} class(es)",
                k
            )));
        }

        let targets: Vec<usize> = y
            .iter()
            .map(|label| classes.iter().position(|c| c == label).unwrap_or(0))
            .collect();

        // Design matrix with a trailing intercept column
        let mut xa = Mat::<f64>::zeros(n, d + 1);
        let mut frobenius_sq = 0.0;
        for row in 0..n {
            for col in 0..d {
                let v = x.get(row, col);
                xa[(row, col)] = v;
                frobenius_sq += v * v;
            }
            xa[(row, d)] = 1.0;
        }
        frobenius_sq += n as f64;

        let n_f = n as f64;
        let penalty = 1.0 / (self.c * n_f);
        let lipschitz = 0.5 * frobenius_sq / n_f + penalty;
        let step = 1.0 / lipschitz;

        let mut w = Mat::<f64>::zeros(d + 1, k);
        let mut w_prev = w.clone();
        let mut n_iter = self.max_iter;
        let mut converged = false;

        for t in 1..=self.max_iter {
            let momentum = (t as f64 - 1.0) / (t as f64 + 2.0);
            let mut lookahead = Mat::<f64>::zeros(d + 1, k);
            for r in 0..=d {
                for j in 0..k {
                    lookahead[(r, j)] = w[(r, j)] + momentum * (w[(r, j)] - w_prev[(r, j)]);
                }
            }

            let grad = gradient(&xa, &lookahead, &targets, penalty)?;
            let max_grad = (0..=d)
                .flat_map(|r| (0..k).map(move |j| (r, j)))
                .map(|(r, j)| grad[(r, j)].abs())
                .fold(0.0_f64, f64::max);

            if max_grad < self.tol {
                w = lookahead;
                n_iter = t;
                converged = true;
                break;
            }

            w_prev = w;
            w = Mat::<f64>::zeros(d + 1, k);
            for r in 0..=d {
                for j in 0..k {
                    w[(r, j)] = lookahead[(r, j)] - step * grad[(r, j)];
                }
            }
        }

        let mut coef = Vec::with_capacity((d + 1) * k);
        for r in 0..=d {
            for j in 0..k {
                coef.push(w[(r, j)]);
            }
        }
        if coef.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::FitFailure(
                "optimization diverged to non-finite weights".to_string(),
            ));
        }

        self.fitted = Some(FittedLogistic {
            classes,
            n_features: d,
            coef,
            n_iter,
            converged,
        });
        Ok(())
    }

    fn fitted(&self) -> Result<&FittedLogistic> {
        self.fitted
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("LogisticRegression".to_string()))
    }

    /// Class probabilities per row, columns ordered as [`Self::classes`]
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        let fitted = self.fitted()?;
        let d = fitted.n_features;
        if x.n_cols() != d {
            return Err(PipelineError::FeatureMismatch {
                expected: d,
                got: x.n_cols(),
            });
        }
        if x.values().iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::InvalidData(
                "LogisticRegression input contains NaN or infinite values".to_string(),
            ));
        }

        let k = fitted.classes.len();
        let proba = (0..x.n_rows())
            .map(|row| {
                let features = x.row(row);
                let mut logits: Vec<f64> = (0..k)
                    .map(|j| {
                        let intercept = fitted.coef[d * k + j];
                        features
                            .iter()
                            .enumerate()
                            .fold(intercept, |acc, (col, v)| acc + v * fitted.coef[col * k + j])
                    })
                    .collect();
                softmax_in_place(&mut logits);
                logits
            })
            .collect();
        Ok(proba)
    }

    /// Most probable class label per row
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
        let fitted = self.fitted()?;
        let proba = self.predict_proba(x)?;
        Ok(proba
            .iter()
            .map(|p| {
                let best = p
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (j, &v)| {
                        if v > best.1 {
                            (j, v)
                        } else {
                            best
                        }
                    })
                    .0;
                fitted.classes[best].clone()
            })
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Class labels seen during fit, in model column order
    pub fn classes(&self) -> Option<&[String]> {
        self.fitted.as_ref().map(|f| f.classes.as_slice())
    }

    /// Iterations run by the last fit
    pub fn n_iter(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_iter)
    }

    /// Whether the last fit reached the gradient tolerance
    pub fn converged(&self) -> Option<bool> {
        self.fitted.as_ref().map(|f| f.converged)
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    /// Hyperparameters as `(name, value)` pairs
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("C".to_string(), self.c.to_string()),
            ("max_iter".to_string(), self.max_iter.to_string()),
            ("multi_class".to_string(), "multinomial".to_string()),
            ("penalty".to_string(), "l2".to_string()),
            ("random_state".to_string(), self.random_state.to_string()),
            ("tol".to_string(), self.tol.to_string()),
        ]
    }
}

/// Gradient of the penalized mean cross-entropy at weights `w`
fn gradient(xa: &Mat<f64>, w: &Mat<f64>, targets: &[usize], penalty: f64) -> Result<Mat<f64>> {
    let n = xa.nrows();
    let k = w.ncols();
    let d = w.nrows() - 1;

    let logits = xa * w;
    let mut residual = Mat::<f64>::zeros(n, k);
    let mut row_logits = vec![0.0; k];
    for i in 0..n {
        for j in 0..k {
            row_logits[j] = logits[(i, j)];
        }
        softmax_in_place(&mut row_logits);
        for j in 0..k {
            let onehot = if targets[i] == j { 1.0 } else { 0.0 };
            residual[(i, j)] = row_logits[j] - onehot;
        }
    }

    let mut grad = xa.transpose() * &residual;
    let n_f = n as f64;
    for r in 0..=d {
        for j in 0..k {
            let mut g = grad[(r, j)] / n_f;
            if r < d {
                g += penalty * w[(r, j)];
            }
            if !g.is_finite() {
                return Err(PipelineError::FitFailure(
                    "gradient became non-finite during optimization".to_string(),
                ));
            }
            grad[(r, j)] = g;
        }
    }
    Ok(grad)
}

fn softmax_in_place(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

/// Build an unfitted classifier from the model settings.
///
/// `random_state` is recorded with the model; the solver itself is deterministic.
pub fn build_model(settings: &ModelSettings) -> LogisticRegression {
    LogisticRegression::new(
        settings.random_state,
        settings.max_iter,
        settings.c,
        settings.tol,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_separable_binary_problem() {
        let x = FeatureMatrix::from_rows(&[
            vec![-2.0],
            vec![-1.5],
            vec![-1.0],
            vec![1.0],
            vec![1.5],
            vec![2.0],
        ])
        .unwrap();
        let y = labels(&["neg", "neg", "neg", "pos", "pos", "pos"]);

        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), y);
        assert_eq!(model.classes().unwrap(), &["neg", "pos"]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let x = FeatureMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]).unwrap();
        let y = labels(&["a", "b", "c"]);
        let mut model = LogisticRegression::new(0, 50, 1.0, 1e-4);
        model.fit(&x, &y).unwrap();

        for row in model.predict_proba(&x).unwrap() {
            let total: f64 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_class_is_fit_failure() {
        let x = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let mut model = LogisticRegression::default();
        let err = model.fit(&x, &labels(&["a", "a"])).unwrap_err();
        assert!(matches!(err, PipelineError::FitFailure(_)));
    }

    #[test]
    fn test_label_count_mismatch_is_fit_failure() {
        let x = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let mut model = LogisticRegression::default();
        let err = model.fit(&x, &labels(&["a"])).unwrap_err();
        assert!(matches!(err, PipelineError::FitFailure(_)));
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let x = FeatureMatrix::from_rows(&[vec![1.0]]).unwrap();
        let model = LogisticRegression::default();
        assert!(matches!(model.predict(&x), Err(PipelineError::NotFitted(_))));
    }

    #[test]
    fn test_max_iter_limits_iterations() {
        let x = FeatureMatrix::from_rows(&[vec![-1.0], vec![1.0]]).unwrap();
        let mut model = LogisticRegression::new(42, 3, 1.0, 1e-12);
        model.fit(&x, &labels(&["a", "b"])).unwrap();
        assert_eq!(model.n_iter(), Some(3));
        assert_eq!(model.converged(), Some(false));
    }

    #[test]
    fn test_infinite_input_rejected_at_predict() {
        let x = FeatureMatrix::from_rows(&[vec![-1.0], vec![1.0]]).unwrap();
        let mut model = LogisticRegression::default();
        model.fit(&x, &labels(&["a", "b"])).unwrap();

        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let x_bad = FeatureMatrix::from_rows(&[vec![bad]]).unwrap();
            assert!(matches!(
                model.predict(&x_bad),
                Err(PipelineError::InvalidData(_))
            ));
        }
    }
}
