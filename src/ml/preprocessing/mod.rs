//! Data preprocessing steps
//!
//! Scalers learn one pair of statistics per column during `fit` and apply
//! `(x - center) / scale` during `transform`. Encoders learn a value mapping.
//! Every stateful step refuses to fit on a lazy frame.

mod binarizer;
mod label;
mod minmax;
mod robust;
mod standard;

pub use binarizer::Binarizer;
pub use label::{LabelEncoder, LabelOrder};
pub use minmax::MinMaxScaler;
pub use robust::RobustScaler;
pub use standard::StandardScaler;

use crate::column::{Column, ColumnType, Float64Column};
use crate::core::error::{Error, Result};
use crate::frame::DataFrame;

/// Which columns a step operates on
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelector {
    /// Explicit column names, which must all exist
    Names(Vec<String>),
    /// Every floating point column
    Numerical,
    /// Every string or boolean column
    Categorical,
    /// Every column
    All,
}

impl ColumnSelector {
    /// Resolve the selector against a frame, in frame column order for kinds
    pub fn resolve(&self, df: &DataFrame) -> Result<Vec<String>> {
        match self {
            ColumnSelector::Names(names) => {
                for name in names {
                    if !df.contains_column(name) {
                        return Err(Error::ColumnNotFound(name.clone()));
                    }
                }
                Ok(names.clone())
            }
            ColumnSelector::Numerical => Ok(df.numerical_columns()),
            ColumnSelector::Categorical => Ok(df.categorical_columns()),
            ColumnSelector::All => Ok(df.column_names().to_vec()),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for ColumnSelector {
    fn from(names: Vec<S>) -> Self {
        ColumnSelector::Names(names.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Names(vec![name.to_string()])
    }
}

/// Fitted affine parameters for one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScaling {
    pub column: String,
    pub center: f64,
    pub scale: f64,
}

/// Absolute tolerance under which a fitted scale counts as zero
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Non-NULL values of a numeric column
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(df.column(name)?.to_f64_options()?.into_iter().flatten().collect())
}

/// Reject a statistic that would make scaling divide by (near) zero
pub(crate) fn check_scale(column: &str, statistic: &str, value: f64, tolerance: f64) -> Result<f64> {
    if !value.is_finite() || value.abs() <= tolerance {
        return Err(Error::DegenerateColumn {
            column: column.to_string(),
            statistic: statistic.to_string(),
        });
    }
    Ok(value)
}

/// Apply `(x - center) / scale` column-wise; results are `Float64`, NULLs stay NULL
pub(crate) fn apply_scaling(df: DataFrame, params: &[ColumnScaling]) -> Result<DataFrame> {
    let mut out = df;
    for p in params {
        let column = out.column(&p.column)?;
        if column.column_type() == ColumnType::String {
            return Err(Error::ColumnTypeMismatch {
                name: p.column.clone(),
                expected: ColumnType::Float64,
                found: ColumnType::String,
            });
        }
        let scaled: Vec<Option<f64>> = column
            .to_f64_options()?
            .into_iter()
            .map(|v| v.map(|x| (x - p.center) / p.scale))
            .collect();
        out.with_column(p.column.clone(), Column::Float64(Float64Column::from_options(scaled)))?;
    }
    Ok(out)
}

/// Median with linear interpolation between the two middle values
pub(crate) fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Quantile by nearest rank: the value at `round(q * (n - 1))`
pub(crate) fn quantile_nearest(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (q * (sorted.len() - 1) as f64).round() as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}
