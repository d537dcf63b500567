use super::{apply_scaling, check_scale, numeric_values, ColumnScaling, ColumnSelector, DEFAULT_TOLERANCE};
use crate::core::error::{Error, Result};
use crate::frame::Frame;
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Standard scaler for normalizing features to zero mean and unit variance
///
/// Uses the sample standard deviation (`n - 1` denominator).
#[derive(Debug, Clone)]
pub struct StandardScaler {
    /// Columns to scale
    columns: ColumnSelector,
    /// Fitted mean and standard deviation per column
    params: Option<Vec<ColumnScaling>>,
    tolerance: f64,
    scope: Option<DiagnosticScope>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a new StandardScaler over all floating point columns
    pub fn new() -> Self {
        StandardScaler {
            columns: ColumnSelector::Numerical,
            params: None,
            tolerance: DEFAULT_TOLERANCE,
            scope: None,
        }
    }

    /// Specify columns to scale
    pub fn with_columns(mut self, columns: impl Into<ColumnSelector>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Override the zero-deviation tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fitted parameters; `center` is the mean and `scale` the deviation
    pub fn params(&self) -> Option<&[ColumnScaling]> {
        self.params.as_deref()
    }
}

impl Transformer for StandardScaler {
    fn name(&self) -> &str {
        "StandardScaler"
    }

    fn fit(&mut self, x: &Frame, _y: Option<&Frame>) -> Result<()> {
        let df = x.require_eager(self.name(), "fit")?;
        self.params = None;

        let mut params = Vec::new();
        for column in self.columns.resolve(df)? {
            let values = numeric_values(df, &column)?;
            let n = values.len();
            if n < 2 {
                return Err(Error::DegenerateColumn {
                    column,
                    statistic: "standard deviation (fewer than two values)".to_string(),
                });
            }

            let mean = values.iter().sum::<f64>() / n as f64;
            let variance =
                values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            let std = check_scale(&column, "standard deviation", variance.sqrt(), self.tolerance)?;

            tracing::debug!(column = %column, mean, std, "standard scaler fitted");
            params.push(ColumnScaling {
                column,
                center: mean,
                scale: std,
            });
        }

        self.params = Some(params);
        Ok(())
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let params = self
            .params
            .clone()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        x.map_frame(self.name(), move |df| apply_scaling(df, &params))
    }

    fn scope(&self) -> Option<&DiagnosticScope> {
        self.scope.as_ref()
    }

    fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
        self.scope = scope;
    }
}
