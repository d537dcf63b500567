//! Machine learning pipelines
//!
//! A [`Pipeline`] chains [`Transformer`] steps, threading one evolving frame
//! through them while handing the original target to every step. A pipeline is
//! itself a transformer, so pipelines nest.

use std::path::PathBuf;

use crate::column::ColumnType;
use crate::config::FramepipeConfig;
use crate::core::error::Result;
use crate::frame::Frame;
use crate::ml::functional::{
    Cast, DropColumns, DropNulls, Dummy, Horizontal, HorizontalOp, Select, SortColumns,
    SortColumnsBy,
};
use crate::ml::models::{NullPredictor, Predictor, Stacker};
use crate::ml::preprocessing::{
    Binarizer, ColumnSelector, LabelEncoder, MinMaxScaler, RobustScaler, StandardScaler,
};
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Ordered sequence of transformer steps
///
/// When a diagnostic root is set, every `fit`, `transform` or `fit_transform`
/// call mints a fresh timestamped run directory below it, and step `i` writes
/// into `<run>/<i>_<StepName>` with `i` zero-padded to the width of the step
/// count.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transformer>>,
    scope: Option<DiagnosticScope>,
    run_scope: Option<DiagnosticScope>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Write diagnostics below `root`
    pub fn with_diagnostics_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scope = Some(DiagnosticScope::new(root));
        self
    }

    /// Empty pipeline using the diagnostics root from `config`
    pub fn from_config(config: &FramepipeConfig) -> Self {
        Pipeline {
            scope: config.diagnostics.root.clone().map(DiagnosticScope::new),
            ..Self::default()
        }
    }

    /// Append a step
    pub fn pipe<T: Transformer + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run directory of the most recent call, if diagnostics are enabled
    pub fn last_run_scope(&self) -> Option<&DiagnosticScope> {
        self.run_scope.as_ref()
    }

    /// Mint a run scope and hand each step its order-prefixed sub-scope
    fn assign_step_scopes(&mut self) {
        let run = self.scope.as_ref().map(DiagnosticScope::timestamped_child);
        let width = self.steps.len().to_string().len();
        for (i, step) in self.steps.iter_mut().enumerate() {
            let name = format!("{:0>width$}_{}", i, step.name(), width = width);
            step.set_scope(run.as_ref().map(|r| r.child(name)));
        }
        if let Some(run) = &run {
            tracing::info!(path = %run.path().display(), steps = self.steps.len(), "pipeline run scope");
        }
        self.run_scope = run;
    }

    pub fn standard_scale(self, columns: impl Into<ColumnSelector>) -> Self {
        self.pipe(StandardScaler::new().with_columns(columns))
    }

    pub fn min_max_scale(self, columns: impl Into<ColumnSelector>) -> Self {
        self.pipe(MinMaxScaler::new().with_columns(columns))
    }

    /// Robust scaling over the `(low, high)` quantile pair
    pub fn robust_scale(
        self,
        columns: impl Into<ColumnSelector>,
        quantile_range: (f64, f64),
    ) -> Result<Self> {
        let scaler = RobustScaler::new(quantile_range.0, quantile_range.1)?.with_columns(columns);
        Ok(self.pipe(scaler))
    }

    pub fn label_encode(self, columns: impl Into<ColumnSelector>) -> Self {
        self.pipe(LabelEncoder::new().with_columns(columns))
    }

    pub fn binarize(self, columns: impl Into<ColumnSelector>, threshold: f64) -> Self {
        self.pipe(
            Binarizer::new()
                .with_columns(columns)
                .with_threshold(threshold),
        )
    }

    /// One-hot encode `columns` with the default `_` separator
    pub fn dummy(self, columns: impl Into<ColumnSelector>, drop_first: bool) -> Self {
        self.pipe(Dummy::new().with_columns(columns).drop_first(drop_first))
    }

    pub fn select<S: Into<String>>(self, columns: Vec<S>) -> Self {
        self.pipe(Select::new(columns))
    }

    pub fn drop<S: Into<String>>(self, columns: Vec<S>, strict: bool) -> Self {
        self.pipe(DropColumns::new(columns).with_strict(strict))
    }

    /// Drop rows with NULLs in `subset`, or in any column when `None`
    pub fn drop_nulls<S: Into<String>>(self, subset: Option<Vec<S>>) -> Self {
        let step = match subset {
            Some(subset) => DropNulls::new().with_subset(subset),
            None => DropNulls::new(),
        };
        self.pipe(step)
    }

    pub fn sort_columns(self, by: SortColumnsBy, descending: bool) -> Self {
        self.pipe(SortColumns::new(by).descending(descending))
    }

    pub fn cast(self, column: impl Into<String>, dtype: ColumnType) -> Self {
        self.pipe(Cast::new().column(column, dtype))
    }

    pub fn horizontal(
        self,
        op: HorizontalOp,
        columns: impl Into<ColumnSelector>,
        name: impl Into<String>,
    ) -> Self {
        self.pipe(Horizontal::new(op, columns).with_name(name))
    }

    /// Wrap `model` in a [`Predictor`] for the given target columns
    pub fn predict<T, S>(self, model: T, target: Vec<S>) -> Self
    where
        T: Transformer + 'static,
        S: Into<String>,
    {
        self.pipe(Predictor::new(model, target))
    }

    /// Impute NULLs of `target` with a [`NullPredictor`] around `model`
    pub fn impute_nulls<T: Transformer + 'static>(self, model: T, target: impl Into<String>) -> Self {
        self.pipe(NullPredictor::new(model, target))
    }

    pub fn stack(self, stacker: Stacker) -> Self {
        self.pipe(stacker)
    }
}

impl Transformer for Pipeline {
    fn name(&self) -> &str {
        "Pipeline"
    }

    /// Same as `fit_transform` with the output discarded
    fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        self.fit_transform(x, y).map(|_| ())
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        self.assign_step_scopes();
        let mut current = x.clone();
        for step in self.steps.iter_mut() {
            tracing::debug!(step = step.name(), "transform");
            current = step.transform(&current)?;
        }
        Ok(current)
    }

    fn fit_transform(&mut self, x: &Frame, y: Option<&Frame>) -> Result<Frame> {
        self.assign_step_scopes();
        let mut current = x.clone();
        for step in self.steps.iter_mut() {
            tracing::debug!(step = step.name(), lazy = current.is_lazy(), "fit_transform");
            current = step.fit_transform(&current, y)?;
        }
        Ok(current)
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
    use crate::core::error::Error;
    use crate::frame::{DataFrame, LazyFrame};

    fn sample() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![10.0, 0.0, 500.0, -500.0]).unwrap();
        df.add_string_column("c", vec!["x".into(), "y".into(), "x".into(), "z".into()])
            .unwrap();
        df
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut pipeline = Pipeline::new()
            .min_max_scale("a")
            .label_encode("c")
            .select(vec!["c", "a"]);
        assert_eq!(pipeline.step_names(), vec!["MinMaxScaler", "LabelEncoder", "Select"]);

        let out = pipeline
            .fit_transform(&Frame::from(sample()), None)
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(out.column_names(), &["c".to_string(), "a".to_string()]);
        assert_eq!(
            out.column("a").unwrap().as_float64().unwrap().to_options(),
            vec![Some(0.51), Some(0.5), Some(1.0), Some(0.0)]
        );
        assert_eq!(
            out.column("c").unwrap().as_int64().unwrap().to_options(),
            vec![Some(0), Some(1), Some(0), Some(2)]
        );

        // fitted steps are reused on new data
        let again = pipeline.transform(&Frame::from(sample())).unwrap();
        assert_eq!(again.collect().unwrap(), out);
    }

    #[test]
    fn test_step_failure_aborts_run() {
        let mut pipeline = Pipeline::new().standard_scale("a").select(vec!["missing"]);
        assert!(pipeline.fit_transform(&Frame::from(sample()), None).is_err());
    }

    #[test]
    fn test_lazy_input_reaches_stateful_steps() {
        let lazy = Frame::from(LazyFrame::new(sample()));
        let mut pipeline = Pipeline::new().select(vec!["a"]).standard_scale("a");
        assert!(matches!(
            pipeline.fit(&lazy, None),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));
    }

    #[test]
    fn test_scopes_are_order_prefixed() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = Pipeline::new().with_diagnostics_root(dir.path());
        for _ in 0..10 {
            pipeline = pipeline.select(vec!["a"]);
        }

        pipeline.fit(&Frame::from(sample()), None).unwrap();
        let run = pipeline.last_run_scope().unwrap().clone();
        assert!(run.path().starts_with(dir.path()));
        assert_eq!(
            pipeline.steps[0].scope(),
            Some(&run.child("00_Select"))
        );
        assert_eq!(pipeline.steps[9].scope(), Some(&run.child("09_Select")));

        pipeline.transform(&Frame::from(sample())).unwrap();
        assert_ne!(pipeline.last_run_scope(), Some(&run));
    }
}
