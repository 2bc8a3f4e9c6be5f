//! Classification metrics: accuracy, macro-F1, per-class report, confusion matrix
//!
//! Precision, recall and F1 of a class with no predicted (or no true) samples
//! are reported as 0.0.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::pipeline::sorted_unique_labels;

/// Precision/recall/F1 for one class or one averaging scheme
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class metrics plus accuracy and macro/weighted averages.
///
/// Serializes to the flat `{label: {...}, "accuracy": ..., "macro avg": {...},
/// "weighted avg": {...}}` layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Labels in report order
    #[serde(skip)]
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub per_class: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassMetrics,
}

/// Summary keys of the serialized report; no class label may use them
pub const RESERVED_REPORT_KEYS: [&str; 3] = ["accuracy", "macro avg", "weighted avg"];

/// Counts of true labels (rows) against predicted labels (columns)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Largest single cell count
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

fn check_lengths(y_true: &[String], y_pred: &[String]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::InvalidData(format!(
            "found {} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::InvalidData(
            "cannot compute metrics on empty label vectors".to_string(),
        ));
    }
    Ok(())
}

fn safe_ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Fraction of predictions equal to the true label
pub fn accuracy_score(y_true: &[String], y_pred: &[String]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Confusion matrix over `labels`, or over all observed labels when `None`
pub fn confusion_matrix(
    y_true: &[String],
    y_pred: &[String],
    labels: Option<&[String]>,
) -> Result<ConfusionMatrix> {
    check_lengths(y_true, y_pred)?;
    let labels = match labels {
        Some(l) => l.to_vec(),
        None => sorted_unique_labels(y_true.iter().chain(y_pred)),
    };
    let index: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
    for (t, p) in y_true.iter().zip(y_pred) {
        if let (Some(&ti), Some(&pi)) = (index.get(t.as_str()), index.get(p.as_str())) {
            counts[ti][pi] += 1;
        }
    }

    Ok(ConfusionMatrix { labels, counts })
}

fn per_class_metrics(cm: &ConfusionMatrix) -> Vec<ClassMetrics> {
    let k = cm.labels.len();
    (0..k)
        .map(|i| {
            let tp = cm.counts[i][i];
            let support: usize = cm.counts[i].iter().sum();
            let predicted: usize = (0..k).map(|r| cm.counts[r][i]).sum();
            let precision = safe_ratio(tp, predicted);
            let recall = safe_ratio(tp, support);
            let f1_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1_score,
                support,
            }
        })
        .collect()
}

/// Unweighted mean of per-class F1 over all observed labels
pub fn f1_macro(y_true: &[String], y_pred: &[String]) -> Result<f64> {
    let cm = confusion_matrix(y_true, y_pred, None)?;
    let metrics = per_class_metrics(&cm);
    Ok(metrics.iter().map(|m| m.f1_score).sum::<f64>() / metrics.len() as f64)
}

/// Full per-class report over every label seen in `y_true` or `y_pred`.
///
/// The `macro avg` F1 always equals [`f1_macro`] for the same inputs.
pub fn classification_report(y_true: &[String], y_pred: &[String]) -> Result<ClassificationReport> {
    check_lengths(y_true, y_pred)?;
    let labels = sorted_unique_labels(y_true.iter().chain(y_pred));
    if let Some(reserved) = labels.iter().find(|l| RESERVED_REPORT_KEYS.contains(&l.as_str())) {
        return Err(PipelineError::InvalidData(format!(
            "class label '{}' collides with a report summary key",
            reserved
        )));
    }
    let cm = confusion_matrix(y_true, y_pred, Some(&labels))?;
    let metrics = per_class_metrics(&cm);

    let total = y_true.len();
    let k = metrics.len() as f64;
    let macro_avg = ClassMetrics {
        precision: metrics.iter().map(|m| m.precision).sum::<f64>() / k,
        recall: metrics.iter().map(|m| m.recall).sum::<f64>() / k,
        f1_score: metrics.iter().map(|m| m.f1_score).sum::<f64>() / k,
        support: total,
    };
    let weighted = |f: fn(&ClassMetrics) -> f64| {
        metrics
            .iter()
            .map(|m| f(m) * m.support as f64)
            .sum::<f64>()
            / total as f64
    };
    let weighted_avg = ClassMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1_score: weighted(|m| m.f1_score),
        support: total,
    };

    Ok(ClassificationReport {
        per_class: labels.iter().cloned().zip(metrics).collect(),
        labels,
        accuracy: accuracy_score(y_true, y_pred)?,
        macro_avg,
        weighted_avg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_accuracy_counts_matches() {
        let acc = accuracy_score(&labels(&["a", "b", "c", "a"]), &labels(&["a", "b", "a", "a"]))
            .unwrap();
        assert!((acc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_errors() {
        assert!(accuracy_score(&labels(&["a"]), &labels(&["a", "b"])).is_err());
    }

    #[test]
    fn test_confusion_matrix_rows_are_true_labels() {
        let cm = confusion_matrix(&labels(&["0", "0", "1"]), &labels(&["0", "1", "1"]), None)
            .unwrap();
        assert_eq!(cm.labels, labels(&["0", "1"]));
        assert_eq!(cm.counts, vec![vec![1, 1], vec![0, 1]]);
        assert_eq!(cm.total(), 3);
    }

    #[test]
    fn test_f1_macro_hand_computed() {
        // class a: tp=1 fp=0 fn=1 -> p=1, r=0.5, f1=2/3
        // class b: tp=1 fp=1 fn=0 -> p=0.5, r=1, f1=2/3
        let f1 = f1_macro(&labels(&["a", "a", "b"]), &labels(&["a", "b", "b"])).unwrap();
        assert!((f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_class_never_predicted_scores_zero() {
        let report =
            classification_report(&labels(&["a", "b"]), &labels(&["a", "a"])).unwrap();
        let b = &report.per_class["b"];
        assert_eq!(b.precision, 0.0);
        assert_eq!(b.recall, 0.0);
        assert_eq!(b.f1_score, 0.0);
        assert_eq!(b.support, 1);
    }

    #[test]
    fn test_label_named_like_summary_key_is_rejected() {
        let err = classification_report(&labels(&["accuracy", "b"]), &labels(&["b", "b"]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidData(_)));
    }
}
