//! Classification model evaluation metrics

use crate::core::error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_score() {
        let true_labels = vec![true, false, true, true, false, false];
        let pred_labels = vec![true, false, false, true, true, false];

        let accuracy = accuracy_score(&true_labels, &pred_labels).unwrap();
        assert!((accuracy - 0.6666666).abs() < 1e-6); // 4/6
    }

    #[test]
    fn test_precision_recall_f1() {
        let true_labels = vec![true, false, true, true, false, false];
        let pred_labels = vec![true, false, false, true, true, false];

        // TP=2, FP=1, FN=1
        let precision = precision_score(&true_labels, &pred_labels).unwrap();
        let recall = recall_score(&true_labels, &pred_labels).unwrap();
        let f1 = f1_score(&true_labels, &pred_labels).unwrap();
        assert!((precision - 0.6666666).abs() < 1e-6);
        assert!((recall - 0.6666666).abs() < 1e-6);
        assert!((f1 - 0.6666666).abs() < 1e-6);
    }

    #[test]
    fn test_no_positive_predictions() {
        let true_labels = vec![true, false];
        let pred_labels = vec![false, false];
        assert_eq!(precision_score(&true_labels, &pred_labels).unwrap(), 0.0);
        assert_eq!(f1_score(&true_labels, &pred_labels).unwrap(), 0.0);
    }

    #[test]
    fn test_log_loss() {
        let loss = log_loss(&[true, false], &[0.9, 0.1]).unwrap();
        assert!((loss - 0.10536051565782628).abs() < 1e-12);
        // clipped instead of infinite
        assert!(log_loss(&[true], &[0.0]).unwrap().is_finite());
    }

    #[test]
    fn test_empty_and_mismatched_input() {
        let empty: Vec<bool> = vec![];
        assert!(accuracy_score(&empty, &empty).is_err());
        assert!(precision_score(&empty, &empty).is_err());
        assert!(accuracy_score(&[true, false, true], &[true, false]).is_err());
    }
}

fn check_lengths(true_len: usize, pred_len: usize) -> Result<()> {
    if true_len != pred_len {
        return Err(Error::InconsistentRowCount {
            expected: true_len,
            found: pred_len,
        });
    }
    if true_len == 0 {
        return Err(Error::InvalidInput(
            "Cannot calculate with empty data".to_string(),
        ));
    }
    Ok(())
}

/// Binary confusion counts `(tp, fp, fn)`
fn confusion(y_true: &[bool], y_pred: &[bool]) -> (usize, usize, usize) {
    y_true
        .iter()
        .zip(y_pred)
        .fold((0, 0, 0), |(tp, fp, fn_), (&t, &p)| match (t, p) {
            (true, true) => (tp + 1, fp, fn_),
            (false, true) => (tp, fp + 1, fn_),
            (true, false) => (tp, fp, fn_ + 1),
            (false, false) => (tp, fp, fn_),
        })
}

/// Calculate accuracy
///
/// # Arguments
/// * `y_true` - True labels
/// * `y_pred` - Predicted labels
///
/// # Returns
/// * `Result<f64>` - Accuracy (0 to 1)
pub fn accuracy_score<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;

    let correct_count = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();

    Ok(correct_count as f64 / y_true.len() as f64)
}

/// Calculate precision (binary classification)
///
/// Returns 0 when nothing is predicted positive.
pub fn precision_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let (tp, fp, _) = confusion(y_true, y_pred);
    if tp + fp == 0 {
        return Ok(0.0);
    }
    Ok(tp as f64 / (tp + fp) as f64)
}

/// Calculate recall (binary classification)
pub fn recall_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let (tp, _, fn_) = confusion(y_true, y_pred);
    if tp + fn_ == 0 {
        return Ok(0.0);
    }
    Ok(tp as f64 / (tp + fn_) as f64)
}

/// Harmonic mean of precision and recall
pub fn f1_score(y_true: &[bool], y_pred: &[bool]) -> Result<f64> {
    let precision = precision_score(y_true, y_pred)?;
    let recall = recall_score(y_true, y_pred)?;
    if precision + recall == 0.0 {
        return Ok(0.0);
    }
    Ok(2.0 * precision * recall / (precision + recall))
}

/// Binary cross-entropy of predicted probabilities
///
/// Probabilities are clipped to `[1e-15, 1 - 1e-15]`.
pub fn log_loss(y_true: &[bool], y_prob: &[f64]) -> Result<f64> {
    check_lengths(y_true.len(), y_prob.len())?;
    const EPS: f64 = 1e-15;

    let total: f64 = y_true
        .iter()
        .zip(y_prob)
        .map(|(&t, &p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            if t {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    Ok(total / y_true.len() as f64)
}
