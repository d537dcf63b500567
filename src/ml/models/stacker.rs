//! K-fold stacking ensemble
//!
//! A [`Stacker`] fits one fresh model per cross-validation fold. It serves
//! two kinds of prediction:
//!
//! * [`Stacker::predict_ensemble`]: every fold member predicts every row and
//!   the predictions are aggregated per row. This is the deployment path and
//!   backs [`Transformer::transform`].
//! * [`Stacker::predict_out_of_fold`]: each training row is predicted only by
//!   the member whose validation partition held it, so no row is scored by a
//!   model that saw it. This backs [`Transformer::fit_transform`] and is what
//!   downstream meta-models should be trained on.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;

use crate::column::Column;
use crate::core::error::{Error, Result};
use crate::frame::{AggregateOp, DataFrame, Frame, RowIndex};
use crate::ml::metrics::MetricsFn;
use crate::ml::model_selection::{CrossValidator, Fold};
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::{ModelFactory, Transformer};

/// File written into the stacker's scope after a fit with a metrics function
pub const METRICS_FILE: &str = "metrics.json";

/// Lifecycle of a [`Stacker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    Unfitted,
    Fitting,
    Fitted,
}

/// Everything a single fold needs, shareable across threads
struct FoldContext<'a> {
    factory: &'a dyn ModelFactory,
    features: &'a DataFrame,
    target: &'a DataFrame,
    metrics_fn: Option<&'a MetricsFn>,
    scope: Option<&'a DiagnosticScope>,
}

type FoldOutcome = (Box<dyn Transformer>, Option<BTreeMap<String, f64>>);

impl FoldContext<'_> {
    fn fit_fold(&self, i: usize, fold: &Fold) -> Result<FoldOutcome> {
        let x_train = self.features.take_rows(&fold.train)?;
        let y_train = self.target.take_rows(&fold.train)?;

        let mut model = self.factory.build();
        model.set_scope(self.scope.map(|s| fold_scope(s, i)));

        tracing::info!(
            fold = i,
            train_rows = fold.train.len(),
            valid_rows = fold.valid.len(),
            model = model.name(),
            "fitting fold"
        );
        model.fit(&Frame::from(x_train), Some(&Frame::from(y_train)))?;

        let metrics = match (self.metrics_fn, self.scope) {
            (Some(metrics_fn), Some(_)) => {
                let x_valid = self.features.take_rows(&fold.valid)?;
                let y_valid = self.target.take_rows(&fold.valid)?;
                let y_pred = model.transform(&Frame::from(x_valid))?.collect()?;
                Some(metrics_fn(&y_valid, &y_pred)?)
            }
            _ => None,
        };
        Ok((model, metrics))
    }
}

fn fold_scope(scope: &DiagnosticScope, i: usize) -> DiagnosticScope {
    scope.child(format!("fold_{}", i))
}

/// Every row must appear in exactly one validation partition
fn check_coverage(folds: &[Fold], n: usize) -> Result<()> {
    let mut seen = vec![0usize; n];
    for fold in folds {
        for &row in &fold.valid {
            let slot = seen.get_mut(row).ok_or(Error::IndexOutOfBounds { index: row, size: n })?;
            *slot += 1;
        }
    }
    match seen.iter().position(|&count| count != 1) {
        Some(row) => Err(Error::InvalidConfig(format!(
            "splitter placed row {} in {} validation partitions",
            row, seen[row]
        ))),
        None => Ok(()),
    }
}

/// Per-fold metric records as `{name: [fold_0, fold_1, ...]}`
fn metrics_by_name(records: &[BTreeMap<String, f64>]) -> BTreeMap<String, Vec<f64>> {
    let mut by_name: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        for (name, value) in record {
            by_name.entry(name.clone()).or_default().push(*value);
        }
    }
    by_name
}

/// K-fold stacking ensemble over models built by a [`ModelFactory`]
pub struct Stacker {
    factory: Box<dyn ModelFactory>,
    splitter: Box<dyn CrossValidator>,
    aggregation: AggregateOp,
    column_aggregations: HashMap<String, AggregateOp>,
    /// Column of X holding group labels for the splitter
    groups: Option<String>,
    metrics_fn: Option<MetricsFn>,
    parallel: bool,

    members: Vec<Box<dyn Transformer>>,
    valid_indices: Vec<Vec<usize>>,
    fitted_rows: usize,
    state: FitState,
    scope: Option<DiagnosticScope>,
}

impl Stacker {
    /// Create an unfitted stacker; members are built by `factory`, one per fold
    pub fn new<F, C>(factory: F, splitter: C) -> Self
    where
        F: ModelFactory + 'static,
        C: CrossValidator + 'static,
    {
        Stacker {
            factory: Box::new(factory),
            splitter: Box::new(splitter),
            aggregation: AggregateOp::default(),
            column_aggregations: HashMap::new(),
            groups: None,
            metrics_fn: None,
            parallel: false,
            members: Vec::new(),
            valid_indices: Vec::new(),
            fitted_rows: 0,
            state: FitState::Unfitted,
            scope: None,
        }
    }

    /// Reduction applied across members in `predict_ensemble` (default mean)
    pub fn with_aggregation(mut self, op: AggregateOp) -> Self {
        self.aggregation = op;
        self
    }

    /// Override the reduction for one prediction column
    pub fn with_column_aggregation(mut self, column: impl Into<String>, op: AggregateOp) -> Self {
        self.column_aggregations.insert(column.into(), op);
        self
    }

    /// Read splitter group labels from `column` of X
    ///
    /// The column is hidden from the members at fit and predict time.
    pub fn with_groups(mut self, column: impl Into<String>) -> Self {
        self.groups = Some(column.into());
        self
    }

    /// Score each member on its validation partition
    ///
    /// Only evaluated when a diagnostic scope is set.
    pub fn with_metrics(mut self, metrics_fn: MetricsFn) -> Self {
        self.metrics_fn = Some(metrics_fn);
        self
    }

    /// Fit folds on the rayon thread pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    /// Validation row positions per fold, in fold order
    pub fn valid_indices(&self) -> &[Vec<usize>] {
        &self.valid_indices
    }

    fn clear(&mut self) {
        self.members.clear();
        self.valid_indices.clear();
        self.fitted_rows = 0;
        self.state = FitState::Unfitted;
    }

    fn features(&self, df: &DataFrame) -> Result<DataFrame> {
        match &self.groups {
            Some(groups) => df.drop_columns(&[groups.as_str()], false),
            None => Ok(df.clone()),
        }
    }

    fn require_fitted(&self) -> Result<()> {
        if self.state != FitState::Fitted {
            return Err(Error::NotFitted(self.name().to_string()));
        }
        Ok(())
    }

    /// Fit one member per fold
    ///
    /// Any fold failure aborts the fit and leaves the stacker unfitted.
    pub fn fit_folds(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        self.clear();
        let x = x.require_eager(self.name(), "fit")?;
        let y = y
            .ok_or_else(|| Error::TargetRequired(self.name().to_string()))?
            .require_eager(self.name(), "fit")?;

        self.state = FitState::Fitting;
        match self.try_fit(x, y) {
            Ok(()) => {
                self.state = FitState::Fitted;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "stacker fit aborted");
                self.clear();
                Err(e)
            }
        }
    }

    fn try_fit(&mut self, x: &DataFrame, y: &DataFrame) -> Result<()> {
        if x.row_count() != y.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: x.row_count(),
                found: y.row_count(),
            });
        }

        let groups: Option<Column> = match &self.groups {
            Some(name) => Some(
                x.column(name)
                    .map_err(|_| {
                        Error::InvalidConfig(format!("group column {} not found", name))
                    })?
                    .clone(),
            ),
            None => None,
        };
        let features = self.features(x)?;

        let folds = self.splitter.split(&features, y, groups.as_ref())?;
        check_coverage(&folds, x.row_count())?;

        let context = FoldContext {
            factory: self.factory.as_ref(),
            features: &features,
            target: y,
            metrics_fn: self.metrics_fn.as_ref(),
            scope: self.scope.as_ref(),
        };
        let outcomes: Vec<FoldOutcome> = if self.parallel {
            folds
                .par_iter()
                .enumerate()
                .map(|(i, fold)| context.fit_fold(i, fold))
                .collect::<Result<_>>()?
        } else {
            folds
                .iter()
                .enumerate()
                .map(|(i, fold)| context.fit_fold(i, fold))
                .collect::<Result<_>>()?
        };

        let mut records = Vec::new();
        for ((model, metrics), fold) in outcomes.into_iter().zip(folds) {
            self.members.push(model);
            self.valid_indices.push(fold.valid);
            records.extend(metrics);
        }
        self.fitted_rows = x.row_count();

        if let Some(scope) = &self.scope {
            if !records.is_empty() {
                scope.write_json(METRICS_FILE, &metrics_by_name(&records))?;
            }
        }
        tracing::info!(folds = self.members.len(), rows = self.fitted_rows, "stacker fitted");
        Ok(())
    }

    /// Aggregate the predictions of every member, row by row
    pub fn predict_ensemble(&mut self, x: &Frame) -> Result<Frame> {
        let df = x.require_eager(self.name(), "transform")?;
        self.require_fitted()?;
        let features = Frame::from(self.features(df)?);

        let predictions = self
            .members
            .iter_mut()
            .map(|member| member.transform(&features)?.collect())
            .collect::<Result<Vec<DataFrame>>>()?;

        let refs: Vec<&DataFrame> = predictions.iter().collect();
        let index = RowIndex::unused_in(&refs);
        let tagged = predictions
            .iter()
            .map(|pred| index.attach(pred))
            .collect::<Result<Vec<_>>>()?;
        let stacked = DataFrame::vstack(&tagged.iter().collect::<Vec<_>>())?;

        let aggregated = stacked
            .group_by(index.name())?
            .aggregate_with(self.aggregation, &self.column_aggregations)?;
        Ok(Frame::Eager(index.restore_order(&aggregated)?))
    }

    /// Predict each fitted row with the member that did not train on it
    ///
    /// `x` must be the frame the stacker was fitted on (same rows, same order).
    pub fn predict_out_of_fold(&mut self, x: &Frame) -> Result<Frame> {
        let df = x.require_eager(self.name(), "transform")?;
        self.require_fitted()?;
        if df.row_count() != self.fitted_rows {
            return Err(Error::InvalidConfig(format!(
                "out-of-fold prediction needs the {} fitted rows, got {}",
                self.fitted_rows,
                df.row_count()
            )));
        }
        let features = self.features(df)?;

        let mut predictions = Vec::with_capacity(self.members.len());
        for (member, valid) in self.members.iter_mut().zip(&self.valid_indices) {
            let rows = Frame::from(features.take_rows(valid)?);
            predictions.push(member.transform(&rows)?.collect()?);
        }

        let refs: Vec<&DataFrame> = predictions.iter().collect();
        let index = RowIndex::unused_in(&refs);
        let tagged = predictions
            .iter()
            .zip(&self.valid_indices)
            .map(|(pred, valid)| index.attach_positions(pred, valid))
            .collect::<Result<Vec<_>>>()?;
        let stacked = DataFrame::vstack(&tagged.iter().collect::<Vec<_>>())?;
        Ok(Frame::Eager(index.restore_order(&stacked)?))
    }
}

impl Transformer for Stacker {
    fn name(&self) -> &str {
        "Stacker"
    }

    fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        self.fit_folds(x, y)
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        self.predict_ensemble(x)
    }

    fn fit_transform(&mut self, x: &Frame, y: Option<&Frame>) -> Result<Frame> {
        self.fit_folds(x, y)?;
        self.predict_out_of_fold(x)
    }

    fn scope(&self) -> Option<&DiagnosticScope> {
        self.scope.as_ref()
    }

    fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
        for (i, member) in self.members.iter_mut().enumerate() {
            member.set_scope(scope.as_ref().map(|s| fold_scope(s, i)));
        }
        self.scope = scope;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Float64Column;
    use crate::ml::model_selection::KFold;
    use std::collections::HashSet;

    /// Predicts 1.0 for ids it was trained on and 0.0 otherwise
    #[derive(Default)]
    struct Memorizer {
        seen: HashSet<i64>,
        target: String,
        scope: Option<DiagnosticScope>,
    }

    impl Transformer for Memorizer {
        fn name(&self) -> &str {
            "Memorizer"
        }

        fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
            let x = x.collect()?;
            self.seen = x
                .column("id")?
                .as_int64()
                .map(|c| c.to_options().into_iter().flatten().collect())
                .unwrap_or_default();
            self.target = y.map(|y| y.collect()).transpose()?.map_or(String::new(), |y| {
                y.column_names()[0].clone()
            });
            Ok(())
        }

        fn transform(&mut self, x: &Frame) -> Result<Frame> {
            let x = x.collect()?;
            let ids = x.column("id")?.as_int64().map(|c| c.to_options()).unwrap_or_default();
            let values = ids
                .iter()
                .map(|id| id.map_or(0.0, |id| f64::from(u8::from(self.seen.contains(&id)))))
                .collect();
            Ok(Frame::from(DataFrame::from_columns([(
                self.target.clone(),
                Column::Float64(Float64Column::new(values)),
            )])?))
        }

        fn scope(&self) -> Option<&DiagnosticScope> {
            self.scope.as_ref()
        }

        fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
            self.scope = scope;
        }
    }

    fn data(n: i64) -> (Frame, Frame) {
        let mut x = DataFrame::new();
        x.add_int_column("id", (0..n).collect()).unwrap();
        let mut y = DataFrame::new();
        y.add_float_column("y", vec![1.0; n as usize]).unwrap();
        (Frame::from(x), Frame::from(y))
    }

    fn values(frame: &Frame) -> Vec<f64> {
        frame.collect().unwrap().column_to_array("y").unwrap().to_vec()
    }

    #[test]
    fn test_out_of_fold_never_sees_its_rows() {
        let (x, y) = data(10);
        let mut stacker = Stacker::new(Memorizer::default, KFold::new(5).with_shuffle(3));
        let oof = stacker.fit_transform(&x, Some(&y)).unwrap();
        assert_eq!(values(&oof), vec![0.0; 10]);

        // every row was seen by four of the five members
        let ensemble = stacker.transform(&x).unwrap();
        for v in values(&ensemble) {
            assert!((v - 0.8).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (x, y) = data(12);
        let mut sequential = Stacker::new(Memorizer::default, KFold::new(4).with_shuffle(9));
        let mut parallel =
            Stacker::new(Memorizer::default, KFold::new(4).with_shuffle(9)).with_parallel(true);

        let a = sequential.fit_transform(&x, Some(&y)).unwrap();
        let b = parallel.fit_transform(&x, Some(&y)).unwrap();
        assert_eq!(values(&a), values(&b));
        assert_eq!(sequential.valid_indices(), parallel.valid_indices());
    }

    #[test]
    fn test_state_machine() {
        let (x, y) = data(6);
        let mut stacker = Stacker::new(Memorizer::default, KFold::new(3));
        assert_eq!(stacker.state(), FitState::Unfitted);
        assert!(matches!(stacker.transform(&x), Err(Error::NotFitted(_))));
        assert!(matches!(stacker.fit(&x, None), Err(Error::TargetRequired(_))));

        stacker.fit(&x, Some(&y)).unwrap();
        assert_eq!(stacker.state(), FitState::Fitted);
        assert_eq!(stacker.n_members(), 3);

        // a failing refit leaves nothing behind
        let (short, _) = data(2);
        assert!(stacker.fit(&short, Some(&y)).is_err());
        assert_eq!(stacker.state(), FitState::Unfitted);
        assert_eq!(stacker.n_members(), 0);

        // so does one rejected before any fold runs
        stacker.fit(&x, Some(&y)).unwrap();
        let lazy = Frame::from(x.clone().lazy());
        assert!(matches!(
            stacker.fit(&lazy, Some(&y)),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));
        assert_eq!(stacker.state(), FitState::Unfitted);
        assert_eq!(stacker.n_members(), 0);
        assert!(stacker.valid_indices().is_empty());

        stacker.fit(&x, Some(&y)).unwrap();
        assert!(matches!(stacker.fit(&x, None), Err(Error::TargetRequired(_))));
        assert_eq!(stacker.state(), FitState::Unfitted);
        assert_eq!(stacker.n_members(), 0);
        assert!(matches!(stacker.transform(&x), Err(Error::NotFitted(_))));
    }

    #[test]
    fn test_out_of_fold_requires_fitted_rows() {
        let (x, y) = data(6);
        let mut stacker = Stacker::new(Memorizer::default, KFold::new(3));
        stacker.fit(&x, Some(&y)).unwrap();
        let (other, _) = data(4);
        assert!(matches!(
            stacker.predict_out_of_fold(&other),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_lazy_frames_rejected() {
        let (x, y) = data(6);
        let mut stacker = Stacker::new(Memorizer::default, KFold::new(3));
        let lazy = Frame::from(x.clone().lazy());
        assert!(matches!(
            stacker.fit(&lazy, Some(&y)),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));

        stacker.fit(&x, Some(&y)).unwrap();
        assert!(matches!(
            stacker.transform(&lazy),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));
    }

    struct Overlapping;

    impl CrossValidator for Overlapping {
        fn n_splits(&self) -> usize {
            2
        }

        fn split(&self, x: &DataFrame, _y: &DataFrame, _g: Option<&Column>) -> Result<Vec<Fold>> {
            let n = x.row_count();
            Ok(vec![Fold::from_valid(vec![0, 1], n), Fold::from_valid(vec![1, 2], n)])
        }
    }

    #[test]
    fn test_overlapping_partitions_rejected() {
        let (x, y) = data(3);
        let mut stacker = Stacker::new(Memorizer::default, Overlapping);
        assert!(matches!(
            stacker.fit(&x, Some(&y)),
            Err(Error::InvalidConfig(_))
        ));
    }
}
