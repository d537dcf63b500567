use super::{
    apply_scaling, check_scale, median, numeric_values, quantile_nearest, ColumnScaling,
    ColumnSelector, DEFAULT_TOLERANCE,
};
use crate::core::error::{Error, Result};
use crate::frame::Frame;
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Scaler centred on the median and scaled by an inter-quantile range
///
/// Quantiles use the nearest-rank rule, so results are always observed values.
#[derive(Debug, Clone)]
pub struct RobustScaler {
    columns: ColumnSelector,
    quantile_range: (f64, f64),
    params: Option<Vec<ColumnScaling>>,
    tolerance: f64,
    scope: Option<DiagnosticScope>,
}

impl Default for RobustScaler {
    fn default() -> Self {
        RobustScaler {
            columns: ColumnSelector::Numerical,
            quantile_range: (0.25, 0.75),
            params: None,
            tolerance: DEFAULT_TOLERANCE,
            scope: None,
        }
    }
}

impl RobustScaler {
    /// Create a RobustScaler for the quantile pair `(low, high)`
    ///
    /// Fails with `InvalidConfig` unless `0 <= low < high <= 1`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(Error::InvalidConfig(format!(
                "quantile_range must be increasing within [0, 1]: ({}, {})",
                low, high
            )));
        }
        Ok(RobustScaler {
            quantile_range: (low, high),
            ..Self::default()
        })
    }

    /// Specify columns to scale
    pub fn with_columns(mut self, columns: impl Into<ColumnSelector>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn quantile_range(&self) -> (f64, f64) {
        self.quantile_range
    }

    pub fn params(&self) -> Option<&[ColumnScaling]> {
        self.params.as_deref()
    }
}

impl Transformer for RobustScaler {
    fn name(&self) -> &str {
        "RobustScaler"
    }

    fn fit(&mut self, x: &Frame, _y: Option<&Frame>) -> Result<()> {
        let df = x.require_eager(self.name(), "fit")?;
        self.params = None;

        let (low, high) = self.quantile_range;
        let mut params = Vec::new();
        for column in self.columns.resolve(df)? {
            let mut values = numeric_values(df, &column)?;
            values.sort_by(f64::total_cmp);

            let (center, q_low, q_high) = match (
                median(&values),
                quantile_nearest(&values, low),
                quantile_nearest(&values, high),
            ) {
                (Some(m), Some(l), Some(h)) => (m, l, h),
                _ => {
                    return Err(Error::DegenerateColumn {
                        column,
                        statistic: "median (no values)".to_string(),
                    })
                }
            };
            let range = check_scale(&column, "inter-quantile range", q_high - q_low, self.tolerance)?;

            tracing::debug!(column = %column, median = center, range, "robust scaler fitted");
            params.push(ColumnScaling {
                column,
                center,
                scale: range,
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
