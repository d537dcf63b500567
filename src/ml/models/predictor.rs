use crate::core::error::{Error, Result};
use crate::frame::Frame;
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Adapts a supervised model to frames that carry their own target columns
///
/// `fit` splits the target columns off the input and fits the wrapped model
/// on the rest; `transform` drops them (when present) before predicting. The
/// wrapped model shares this step's diagnostic scope.
pub struct Predictor {
    model: Box<dyn Transformer>,
    target: Vec<String>,
    scope: Option<DiagnosticScope>,
}

impl Predictor {
    pub fn new<T, S>(model: T, target: Vec<S>) -> Self
    where
        T: Transformer + 'static,
        S: Into<String>,
    {
        Predictor {
            model: Box::new(model),
            target: target.into_iter().map(Into::into).collect(),
            scope: None,
        }
    }

    pub fn target(&self) -> &[String] {
        &self.target
    }

    pub fn model(&self) -> &dyn Transformer {
        self.model.as_ref()
    }
}

impl Transformer for Predictor {
    fn name(&self) -> &str {
        "Predictor"
    }

    fn fit(&mut self, x: &Frame, _y: Option<&Frame>) -> Result<()> {
        let df = x.require_eager(self.name(), "fit")?;
        if let Some(missing) = self.target.iter().find(|t| !df.contains_column(t)) {
            return Err(Error::InvalidConfig(format!(
                "target column {} not found in the training frame",
                missing
            )));
        }

        let y = df.select_columns(self.target.as_slice())?;
        let features = df.drop_columns(self.target.as_slice(), true)?;
        tracing::debug!(
            model = self.model.name(),
            target = ?self.target,
            rows = df.row_count(),
            "fitting wrapped model"
        );
        self.model.fit(&Frame::from(features), Some(&Frame::from(y)))
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let features = match x {
            Frame::Eager(df) => Frame::Eager(df.drop_columns(self.target.as_slice(), false)?),
            Frame::Lazy(plan) => Frame::Lazy(plan.clone().drop(self.target.as_slice(), false)),
        };
        self.model.transform(&features)
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
    use crate::frame::DataFrame;
    use crate::ml::models::LinearRegression;

    fn training() -> Frame {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        df.add_float_column("y", vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        Frame::from(df)
    }

    #[test]
    fn test_fit_splits_target_and_transform_drops_it() {
        let mut predictor = Predictor::new(LinearRegression::new(), vec!["y"]);
        predictor.fit(&training(), None).unwrap();

        // the target column is optional at transform time
        let out = predictor.transform(&training()).unwrap().collect().unwrap();
        assert_eq!(out.column_names(), &["y".to_string()]);

        let mut features = DataFrame::new();
        features.add_float_column("a", vec![10.0]).unwrap();
        let out = predictor
            .transform(&Frame::from(features))
            .unwrap()
            .collect()
            .unwrap();
        let value = out.column_to_array("y").unwrap()[0];
        assert!((value - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_target_is_invalid_config() {
        let mut predictor = Predictor::new(LinearRegression::new(), vec!["missing"]);
        assert!(matches!(
            predictor.fit(&training(), None),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scope_reaches_wrapped_model() {
        let mut predictor = Predictor::new(LinearRegression::new(), vec!["y"]);
        let scope = DiagnosticScope::new("/tmp/framepipe-test/predictor");
        predictor.set_scope(Some(scope.clone()));
        assert_eq!(predictor.model().scope(), Some(&scope));
    }
}
