use crate::core::error::{Error, Result};
use crate::frame::{DataFrame, Frame, RowIndex};
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Imputes one column with a model trained on the rows where it is present
///
/// Rows whose target is present pass through untouched; only NULL targets
/// are replaced by predictions. Output row count and order always equal the
/// input's.
pub struct NullPredictor {
    model: Box<dyn Transformer>,
    target: String,
    exclude: Vec<String>,
    scope: Option<DiagnosticScope>,
}

impl NullPredictor {
    pub fn new<T>(model: T, target: impl Into<String>) -> Self
    where
        T: Transformer + 'static,
    {
        NullPredictor {
            model: Box::new(model),
            target: target.into(),
            exclude: Vec::new(),
            scope: None,
        }
    }

    /// Columns kept in the frame but hidden from the model
    pub fn with_exclude<S: Into<String>>(mut self, exclude: Vec<S>) -> Self {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    fn hidden_columns(&self) -> Vec<&str> {
        std::iter::once(self.target.as_str())
            .chain(self.exclude.iter().map(String::as_str))
            .collect()
    }

    fn impute(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let target_type = df.column_type(&self.target)?;
        let missing = df.column(&self.target)?.null_flags();
        if !missing.iter().any(|&m| m) {
            return Ok(df.clone());
        }

        let index = RowIndex::unused_in(&[df]);
        let indexed = index.attach(df)?;
        let present_mask: Vec<bool> = missing.iter().map(|&m| !m).collect();
        let present = indexed.filter_by_mask(&present_mask)?;
        let mut absent = indexed.filter_by_mask(&missing)?;

        let mut hidden = self.hidden_columns();
        hidden.push(index.name());
        let features = absent.drop_columns(hidden.as_slice(), true)?;
        let prediction = self.model.transform(&Frame::from(features))?.collect()?;

        let predicted = match prediction.iter_columns().next() {
            Some((_, column)) => column.cast(target_type)?,
            None => {
                return Err(Error::Computation(format!(
                    "{} produced no prediction columns",
                    self.model.name()
                )))
            }
        };
        if predicted.len() != absent.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: absent.row_count(),
                found: predicted.len(),
            });
        }
        absent.with_column(self.target.clone(), predicted)?;

        let stacked = DataFrame::vstack(&[&present, &absent])?;
        tracing::debug!(
            target = %self.target,
            imputed = absent.row_count(),
            rows = df.row_count(),
            "null values imputed"
        );
        index.restore_order(&stacked)
    }
}

impl Transformer for NullPredictor {
    fn name(&self) -> &str {
        "NullPredictor"
    }

    fn fit(&mut self, x: &Frame, _y: Option<&Frame>) -> Result<()> {
        let df = x.require_eager(self.name(), "fit")?;
        if !df.contains_column(&self.target) {
            return Err(Error::InvalidConfig(format!(
                "target column {} not found in the training frame",
                self.target
            )));
        }

        let subset = [self.target.as_str()];
        let observed = df.drop_nulls(Some(&subset[..]))?;
        let y = observed.select_columns(&[self.target.as_str()])?;
        let features = observed.drop_columns(self.hidden_columns().as_slice(), true)?;
        tracing::debug!(
            target = %self.target,
            rows = observed.row_count(),
            "fitting imputation model"
        );
        self.model
            .fit(&Frame::from(features), Some(&Frame::from(y)))
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let df = x.require_eager(self.name(), "transform")?;
        Ok(Frame::Eager(self.impute(df)?))
    }

    fn scope(&self) -> Option<&DiagnosticScope> {
        self.scope.as_ref()
    }

    fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
        self.model.set_scope(scope.clone());
        self.scope = scope;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Float64Column, Int64Column};
    use crate::ml::models::LinearRegression;

    fn frame() -> Frame {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        df.add_column(
            "b",
            Int64Column::from_options(vec![Some(1), None, Some(5), None, Some(9), Some(11)]),
        )
        .unwrap();
        df.add_string_column("tag", vec!["x".into(); 6]).unwrap();
        Frame::from(df)
    }

    #[test]
    fn test_only_null_rows_change() {
        let mut imputer =
            NullPredictor::new(LinearRegression::new(), "b").with_exclude(vec!["tag"]);
        let out = imputer.fit_transform(&frame(), None).unwrap().collect().unwrap();

        assert_eq!(
            out.column_names(),
            &["a".to_string(), "b".to_string(), "tag".to_string()]
        );
        // b = 2a + 1, cast back to Int64
        assert_eq!(
            out.column("b").unwrap().as_int64().unwrap().to_options(),
            vec![Some(1), Some(3), Some(5), Some(7), Some(9), Some(11)]
        );
        assert_eq!(
            out.column("a").unwrap().to_f64_options().unwrap(),
            frame().collect().unwrap().column("a").unwrap().to_f64_options().unwrap()
        );
    }

    #[test]
    fn test_no_nulls_returns_input() {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![0.0, 1.0]).unwrap();
        df.add_column("b", Float64Column::new(vec![1.0, 3.0])).unwrap();
        let x = Frame::from(df.clone());

        let mut imputer = NullPredictor::new(LinearRegression::new(), "b");
        imputer.fit(&x, None).unwrap();
        assert_eq!(imputer.transform(&x).unwrap().collect().unwrap(), df);
    }

    #[test]
    fn test_lazy_frames_rejected() {
        let lazy = Frame::from(frame().lazy());
        let mut imputer = NullPredictor::new(LinearRegression::new(), "b");
        assert!(matches!(
            imputer.fit(&lazy, None),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));
    }
}
