//! Regression model evaluation metrics

use crate::core::error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_squared_error() {
        let y_true = vec![3.0, 5.0, 2.5, 7.0, 10.0];
        let y_pred = vec![2.8, 4.8, 2.7, 7.2, 9.8];

        let mse = mean_squared_error(&y_true, &y_pred).unwrap();
        assert!((mse - 0.04).abs() < 1e-6);

        let mae = mean_absolute_error(&y_true, &y_pred).unwrap();
        assert!((mae - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_r2_score() {
        let y_true = vec![3.0, 5.0, 2.5, 7.0, 10.0];
        let y_pred = vec![2.8, 4.8, 2.7, 7.2, 9.8];

        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert!(r2 > 0.99);

        // constant target
        assert_eq!(r2_score(&[1.0, 1.0], &[1.0, 1.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[1.0, 1.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_and_mismatched_input() {
        let empty: Vec<f64> = vec![];
        assert!(mean_squared_error(&empty, &empty).is_err());
        assert!(r2_score(&empty, &empty).is_err());
        assert!(mean_absolute_error(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_err());
    }
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::InconsistentRowCount {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(Error::InvalidInput(
            "Cannot calculate with empty data".to_string(),
        ));
    }
    Ok(())
}

/// Calculate Mean Squared Error (MSE)
///
/// # Arguments
/// * `y_true` - True values
/// * `y_pred` - Predicted values
///
/// # Returns
/// * `Result<f64>` - Mean Squared Error
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let sum_squared_error: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();

    Ok(sum_squared_error / y_true.len() as f64)
}

/// Calculate Mean Absolute Error (MAE)
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let sum_absolute_error: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs())
        .sum();

    Ok(sum_absolute_error / y_true.len() as f64)
}

/// Calculate the coefficient of determination (R²)
///
/// A constant target scores 1 when predicted exactly and 0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let y_mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|&y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}
