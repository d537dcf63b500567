use super::{apply_scaling, check_scale, numeric_values, ColumnScaling, ColumnSelector, DEFAULT_TOLERANCE};
use crate::core::error::{Error, Result};
use crate::frame::Frame;
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Min-max scaler mapping the fitted range onto `[0, 1]`
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    columns: ColumnSelector,
    /// `center` is the minimum, `scale` the range
    params: Option<Vec<ColumnScaling>>,
    tolerance: f64,
    scope: Option<DiagnosticScope>,
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl MinMaxScaler {
    /// Create a new MinMaxScaler over all floating point columns
    pub fn new() -> Self {
        MinMaxScaler {
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

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn params(&self) -> Option<&[ColumnScaling]> {
        self.params.as_deref()
    }
}

impl Transformer for MinMaxScaler {
    fn name(&self) -> &str {
        "MinMaxScaler"
    }

    fn fit(&mut self, x: &Frame, _y: Option<&Frame>) -> Result<()> {
        let df = x.require_eager(self.name(), "fit")?;
        self.params = None;

        let mut params = Vec::new();
        for column in self.columns.resolve(df)? {
            let values = numeric_values(df, &column)?;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = check_scale(&column, "max - min", max - min, self.tolerance)?;

            tracing::debug!(column = %column, min, max, "min-max scaler fitted");
            params.push(ColumnScaling {
                column,
                center: min,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DataFrame;

    #[test]
    fn test_known_values() {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![10.0, 0.0, 500.0, -500.0]).unwrap();
        let x = Frame::from(df);

        let mut scaler = MinMaxScaler::new().with_columns(vec!["a"]);
        let out = scaler.fit_transform(&x, None).unwrap().collect().unwrap();

        let params = scaler.params().unwrap();
        assert_eq!(params[0].center, -500.0);
        assert_eq!(params[0].scale, 1000.0);
        assert_eq!(
            out.column("a").unwrap().as_float64().unwrap().to_options(),
            vec![Some(0.51), Some(0.5), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn test_constant_and_empty_columns_are_degenerate() {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![3.0, 3.0]).unwrap();
        assert!(matches!(
            MinMaxScaler::new().fit(&Frame::from(df), None),
            Err(Error::DegenerateColumn { .. })
        ));

        let mut empty = DataFrame::new();
        empty.add_float_column("a", vec![]).unwrap();
        assert!(MinMaxScaler::new().fit(&Frame::from(empty), None).is_err());
    }
}
