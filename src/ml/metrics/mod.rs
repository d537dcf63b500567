//! Machine learning evaluation metrics module
//!
//! Provides metrics for evaluating regression and classification models, and
//! frame-level metric sets used to score ensemble members on their validation
//! folds.

pub mod classification;
pub mod regression;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::frame::DataFrame;

pub use classification::{accuracy_score, f1_score, log_loss, precision_score, recall_score};
pub use regression::{mean_absolute_error, mean_squared_error, r2_score};

/// Scores `(y_true, y_pred)` frames into named metric values
pub type MetricsFn =
    Arc<dyn Fn(&DataFrame, &DataFrame) -> Result<BTreeMap<String, f64>> + Send + Sync>;

/// Values of the first column of a single-column frame
fn single_column(df: &DataFrame, role: &str) -> Result<Vec<f64>> {
    let name = df
        .column_names()
        .first()
        .ok_or_else(|| Error::InvalidInput(format!("{} frame has no columns", role)))?;
    df.column(name)?
        .to_f64_options()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| Error::InvalidValue(format!("{} has a NULL at row {}", role, i)))
        })
        .collect()
}

/// Binary classification metrics over predicted probabilities
///
/// True labels count as positive when non-zero; predictions when strictly
/// above `threshold`. Produces `accuracy`, `precision`, `recall`, `f1` and
/// `log_loss`.
pub fn classification_metrics(threshold: f64) -> MetricsFn {
    Arc::new(move |y_true: &DataFrame, y_pred: &DataFrame| {
        let truth: Vec<bool> = single_column(y_true, "y_true")?
            .into_iter()
            .map(|v| v != 0.0)
            .collect();
        let prob = single_column(y_pred, "y_pred")?;
        let labels: Vec<bool> = prob.iter().map(|&p| p > threshold).collect();

        let mut scores = BTreeMap::new();
        scores.insert("accuracy".to_string(), accuracy_score(&truth, &labels)?);
        scores.insert("precision".to_string(), precision_score(&truth, &labels)?);
        scores.insert("recall".to_string(), recall_score(&truth, &labels)?);
        scores.insert("f1".to_string(), f1_score(&truth, &labels)?);
        scores.insert("log_loss".to_string(), log_loss(&truth, &prob)?);
        Ok(scores)
    })
}

/// `mse`, `mae` and `r2` of a numeric prediction
pub fn regression_metrics() -> MetricsFn {
    Arc::new(|y_true: &DataFrame, y_pred: &DataFrame| {
        let truth = single_column(y_true, "y_true")?;
        let pred = single_column(y_pred, "y_pred")?;

        let mut scores = BTreeMap::new();
        scores.insert("mse".to_string(), mean_squared_error(&truth, &pred)?);
        scores.insert("mae".to_string(), mean_absolute_error(&truth, &pred)?);
        scores.insert("r2".to_string(), r2_score(&truth, &pred)?);
        Ok(scores)
    })
}
