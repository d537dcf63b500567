use super::ColumnSelector;
use crate::column::Int64Column;
use crate::core::error::Result;
use crate::frame::{DataFrame, Frame};
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Thresholds numeric columns into `Int64` 0/1 flags
///
/// Stateless: values strictly above the threshold become 1. NULLs stay NULL.
#[derive(Debug, Clone)]
pub struct Binarizer {
    columns: ColumnSelector,
    threshold: f64,
    scope: Option<DiagnosticScope>,
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Binarizer {
    /// Binarize every column at 0.5
    pub fn new() -> Self {
        Binarizer {
            columns: ColumnSelector::All,
            threshold: 0.5,
            scope: None,
        }
    }

    pub fn with_columns(mut self, columns: impl Into<ColumnSelector>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

fn binarize(df: DataFrame, columns: &ColumnSelector, threshold: f64) -> Result<DataFrame> {
    let mut out = df;
    for name in columns.resolve(&out)? {
        let flags: Vec<Option<i64>> = out
            .column(&name)?
            .to_f64_options()?
            .into_iter()
            .map(|v| v.map(|x| i64::from(x > threshold)))
            .collect();
        out.with_column(name, Int64Column::from_options(flags))?;
    }
    Ok(out)
}

impl Transformer for Binarizer {
    fn name(&self) -> &str {
        "Binarizer"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let columns = self.columns.clone();
        let threshold = self.threshold;
        x.map_frame(self.name(), move |df| binarize(df, &columns, threshold))
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
    use crate::column::Float64Column;
    use crate::frame::LazyFrame;

    #[test]
    fn test_binarize_lazy_and_eager() {
        let mut df = DataFrame::new();
        df.add_column(
            "p",
            Float64Column::from_options(vec![Some(0.2), Some(0.5), Some(0.9), None]),
        )
        .unwrap();

        let mut step = Binarizer::new().with_columns("p");
        let eager = step.transform(&Frame::from(df.clone())).unwrap();
        let lazy = step.transform(&Frame::from(LazyFrame::new(df))).unwrap();
        assert!(lazy.is_lazy());

        for frame in [eager, lazy] {
            let out = frame.collect().unwrap();
            assert_eq!(
                out.column("p").unwrap().as_int64().unwrap().to_options(),
                vec![Some(0), Some(0), Some(1), None]
            );
        }
    }
}
