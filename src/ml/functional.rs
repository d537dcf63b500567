//! Stateless frame-to-frame steps
//!
//! None of these learn anything in `fit`. Apart from [`SortColumns`] and
//! [`Dummy`], which need the materialized data, they all accept lazy frames
//! and queue themselves onto the plan.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::column::{BooleanColumn, Column, ColumnType, Float64Column, Int64Column, ValueKey};
use crate::core::error::{Error, Result};
use crate::frame::{DataFrame, Frame, LazyFrame};
use crate::ml::preprocessing::ColumnSelector;
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Run `eager` on a materialized frame or extend the plan of a lazy one
fn defer<E, L>(x: &Frame, eager: E, lazy: L) -> Result<Frame>
where
    E: FnOnce(&DataFrame) -> Result<DataFrame>,
    L: FnOnce(LazyFrame) -> LazyFrame,
{
    match x {
        Frame::Eager(df) => Ok(Frame::Eager(eager(df)?)),
        Frame::Lazy(plan) => Ok(Frame::Lazy(lazy(plan.clone()))),
    }
}

macro_rules! scoped {
    () => {
        fn scope(&self) -> Option<&DiagnosticScope> {
            self.scope.as_ref()
        }

        fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
            self.scope = scope;
        }
    };
}

/// Keep only the named columns, in the given order
#[derive(Debug, Clone)]
pub struct Select {
    columns: Vec<String>,
    scope: Option<DiagnosticScope>,
}

impl Select {
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Select {
            columns: columns.into_iter().map(Into::into).collect(),
            scope: None,
        }
    }
}

impl Transformer for Select {
    fn name(&self) -> &str {
        "Select"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        defer(
            x,
            |df| df.select_columns(self.columns.as_slice()),
            |plan| plan.select(self.columns.as_slice()),
        )
    }

    scoped!();
}

/// Remove the named columns
///
/// With `strict` set, a missing column is an error; otherwise it is ignored.
#[derive(Debug, Clone)]
pub struct DropColumns {
    columns: Vec<String>,
    strict: bool,
    scope: Option<DiagnosticScope>,
}

impl DropColumns {
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        DropColumns {
            columns: columns.into_iter().map(Into::into).collect(),
            strict: true,
            scope: None,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Transformer for DropColumns {
    fn name(&self) -> &str {
        "DropColumns"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        defer(
            x,
            |df| df.drop_columns(self.columns.as_slice(), self.strict),
            |plan| plan.drop(self.columns.as_slice(), self.strict),
        )
    }

    scoped!();
}

/// Remove rows holding a NULL in any of `subset` (every column by default)
#[derive(Debug, Clone, Default)]
pub struct DropNulls {
    subset: Option<Vec<String>>,
    scope: Option<DiagnosticScope>,
}

impl DropNulls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subset<S: Into<String>>(mut self, subset: Vec<S>) -> Self {
        self.subset = Some(subset.into_iter().map(Into::into).collect());
        self
    }
}

impl Transformer for DropNulls {
    fn name(&self) -> &str {
        "DropNulls"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        defer(
            x,
            |df| df.drop_nulls(self.subset.as_deref()),
            |plan| plan.drop_nulls(self.subset.clone()),
        )
    }

    scoped!();
}

/// Key used by [`SortColumns`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortColumnsBy {
    /// Column name
    #[default]
    Name,
    /// Column type, then original position
    Dtype,
}

/// Reorder columns by name or type
#[derive(Debug, Clone, Default)]
pub struct SortColumns {
    by: SortColumnsBy,
    descending: bool,
    scope: Option<DiagnosticScope>,
}

impl SortColumns {
    pub fn new(by: SortColumnsBy) -> Self {
        SortColumns {
            by,
            ..Self::default()
        }
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }
}

impl Transformer for SortColumns {
    fn name(&self) -> &str {
        "SortColumns"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let df = x.require_eager(self.name(), "transform")?;

        let mut order: Vec<(ColumnType, String)> = df
            .iter_columns()
            .map(|(name, column)| (column.column_type(), name.to_string()))
            .collect();
        match self.by {
            SortColumnsBy::Name => order.sort_by(|a, b| a.1.cmp(&b.1)),
            SortColumnsBy::Dtype => order.sort_by_key(|(dtype, _)| *dtype),
        }
        if self.descending {
            order.reverse();
        }

        let names: Vec<String> = order.into_iter().map(|(_, name)| name).collect();
        Ok(Frame::Eager(df.select_columns(names.as_slice())?))
    }

    scoped!();
}

/// One-hot encode columns into `Int64` indicator columns
///
/// Each encoded column is replaced, in place, by one `{column}{separator}{value}`
/// column per distinct value in first-seen order. NULL gets its own
/// `{column}{separator}null` indicator. The output schema depends on the data,
/// so lazy frames are rejected.
#[derive(Debug, Clone)]
pub struct Dummy {
    columns: ColumnSelector,
    separator: String,
    drop_first: bool,
    scope: Option<DiagnosticScope>,
}

impl Default for Dummy {
    fn default() -> Self {
        Self::new()
    }
}

impl Dummy {
    /// Encode every column, separating names and values with `_`
    pub fn new() -> Self {
        Dummy {
            columns: ColumnSelector::All,
            separator: "_".to_string(),
            drop_first: false,
            scope: None,
        }
    }

    pub fn with_columns(mut self, columns: impl Into<ColumnSelector>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Leave out the indicator of each column's first value
    pub fn drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }
}

fn dummies(df: &DataFrame, encode: &[String], separator: &str, drop_first: bool) -> Result<DataFrame> {
    let mut out = DataFrame::with_row_count(df.row_count());
    for (name, column) in df.iter_columns() {
        if !encode.iter().any(|c| c == name) {
            out.add_column(name, column.clone())?;
            continue;
        }

        let keys = (0..column.len())
            .map(|i| column.key_at(i))
            .collect::<Result<Vec<Option<ValueKey>>>>()?;
        let mut seen = HashSet::new();
        let levels: Vec<&Option<ValueKey>> = keys.iter().filter(|k| seen.insert(*k)).collect();

        for level in levels.into_iter().skip(usize::from(drop_first)) {
            let label = match level {
                Some(key) => key.to_string(),
                None => "null".to_string(),
            };
            let flags: Vec<i64> = keys.iter().map(|k| i64::from(k == level)).collect();
            out.add_column(
                format!("{}{}{}", name, separator, label),
                Int64Column::new(flags),
            )?;
        }
    }
    Ok(out)
}

impl Transformer for Dummy {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let df = x.require_eager(self.name(), "transform")?;
        let encode = self.columns.resolve(df)?;
        let out = dummies(df, &encode, &self.separator, self.drop_first)?;
        tracing::debug!(
            encoded = encode.len(),
            columns = out.column_count(),
            "dummy columns built"
        );
        Ok(Frame::Eager(out))
    }

    scoped!();
}

/// Convert columns to new types
#[derive(Debug, Clone, Default)]
pub struct Cast {
    casts: Vec<(String, ColumnType)>,
    scope: Option<DiagnosticScope>,
}

impl Cast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column -> dtype` conversion
    pub fn column(mut self, name: impl Into<String>, dtype: ColumnType) -> Self {
        self.casts.push((name.into(), dtype));
        self
    }
}

fn cast_columns(df: DataFrame, casts: &[(String, ColumnType)]) -> Result<DataFrame> {
    let mut out = df;
    for (name, dtype) in casts {
        let cast = out.column(name)?.cast(*dtype)?;
        out.with_column(name.clone(), cast)?;
    }
    Ok(out)
}

impl Transformer for Cast {
    fn name(&self) -> &str {
        "Cast"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let casts = self.casts.clone();
        x.map_frame(self.name(), move |df| cast_columns(df, &casts))
    }

    scoped!();
}

/// Row-wise reductions across columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalOp {
    Mean,
    Sum,
    Prod,
    /// Every value non-zero
    All,
    /// Some value non-zero
    Any,
    Max,
    Min,
    /// First position of the maximum
    ArgMax,
    /// First position of the minimum
    ArgMin,
}

impl HorizontalOp {
    fn default_name(&self) -> &'static str {
        match self {
            HorizontalOp::Mean => "mean",
            HorizontalOp::Sum => "sum",
            HorizontalOp::Prod => "prod",
            HorizontalOp::All => "all",
            HorizontalOp::Any => "any",
            HorizontalOp::Max => "max",
            HorizontalOp::Min => "min",
            HorizontalOp::ArgMax => "argmax",
            HorizontalOp::ArgMin => "argmin",
        }
    }
}

/// Appends (or replaces) one column reducing each row across `columns`
///
/// A row with a NULL in any input column yields NULL.
#[derive(Debug, Clone)]
pub struct Horizontal {
    op: HorizontalOp,
    columns: ColumnSelector,
    output: String,
    scope: Option<DiagnosticScope>,
}

impl Horizontal {
    pub fn new(op: HorizontalOp, columns: impl Into<ColumnSelector>) -> Self {
        Horizontal {
            op,
            columns: columns.into(),
            output: op.default_name().to_string(),
            scope: None,
        }
    }

    /// Name of the output column
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.output = name.into();
        self
    }
}

fn first_position(row: &[f64], better: impl Fn(f64, f64) -> bool) -> i64 {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate().skip(1) {
        if better(v, row[best]) {
            best = i;
        }
    }
    best as i64
}

fn reduce_rows(df: DataFrame, op: HorizontalOp, columns: &ColumnSelector, output: &str) -> Result<DataFrame> {
    let names = columns.resolve(&df)?;
    if names.is_empty() {
        return Err(Error::InvalidInput(format!(
            "horizontal {} needs at least one column",
            op.default_name()
        )));
    }

    let inputs = names
        .iter()
        .map(|name| df.column(name)?.to_f64_options())
        .collect::<Result<Vec<_>>>()?;

    let rows: Vec<Option<Vec<f64>>> = (0..df.row_count())
        .map(|i| inputs.iter().map(|col| col[i]).collect())
        .collect();

    let column: Column = match op {
        HorizontalOp::All | HorizontalOp::Any => {
            let any = op == HorizontalOp::Any;
            BooleanColumn::from_options(
                rows.iter()
                    .map(|row| {
                        row.as_ref().map(|r| {
                            if any {
                                r.iter().any(|&v| v != 0.0)
                            } else {
                                r.iter().all(|&v| v != 0.0)
                            }
                        })
                    })
                    .collect(),
            )
            .into()
        }
        HorizontalOp::ArgMax | HorizontalOp::ArgMin => {
            let max = op == HorizontalOp::ArgMax;
            Int64Column::from_options(
                rows.iter()
                    .map(|row| {
                        row.as_ref().map(|r| {
                            if max {
                                first_position(r, |a, b| a > b)
                            } else {
                                first_position(r, |a, b| a < b)
                            }
                        })
                    })
                    .collect(),
            )
            .into()
        }
        _ => Float64Column::from_options(
            rows.iter()
                .map(|row| {
                    row.as_ref().map(|r| match op {
                        HorizontalOp::Mean => r.iter().sum::<f64>() / r.len() as f64,
                        HorizontalOp::Sum => r.iter().sum(),
                        HorizontalOp::Prod => r.iter().product(),
                        HorizontalOp::Max => r.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                        _ => r.iter().copied().fold(f64::INFINITY, f64::min),
                    })
                })
                .collect(),
        )
        .into(),
    };

    let mut out = df;
    out.with_column(output, column)?;
    Ok(out)
}

impl Transformer for Horizontal {
    fn name(&self) -> &str {
        "Horizontal"
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let (op, columns, output) = (self.op, self.columns.clone(), self.output.clone());
        x.map_frame(self.name(), move |df| reduce_rows(df, op, &columns, &output))
    }

    scoped!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::StringColumn;

    fn sample() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_column("b", Float64Column::from_options(vec![Some(1.0), Some(5.0), None]))
            .unwrap();
        df.add_int_column("a", vec![3, 5, 1]).unwrap();
        df.add_string_column("s", vec!["x".into(), "y".into(), "z".into()])
            .unwrap();
        df
    }

    #[test]
    fn test_select_and_drop_on_lazy_frames() {
        let lazy = Frame::from(LazyFrame::new(sample()));

        let selected = Select::new(vec!["s", "a"]).transform(&lazy).unwrap();
        assert!(selected.is_lazy());
        assert_eq!(
            selected.collect().unwrap().column_names(),
            &["s".to_string(), "a".to_string()]
        );

        let dropped = DropColumns::new(vec!["missing", "b"])
            .with_strict(false)
            .transform(&lazy)
            .unwrap();
        assert_eq!(dropped.collect().unwrap().column_count(), 2);

        let strict = DropColumns::new(vec!["missing"]).transform(&lazy).unwrap();
        assert!(strict.collect().is_err());
    }

    #[test]
    fn test_drop_nulls() {
        let out = DropNulls::new()
            .with_subset(vec!["b"])
            .transform(&Frame::from(sample()))
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn test_sort_columns() {
        let x = Frame::from(sample());
        let by_name = SortColumns::new(SortColumnsBy::Name).transform(&x).unwrap();
        assert_eq!(
            by_name.collect().unwrap().column_names(),
            &["a".to_string(), "b".to_string(), "s".to_string()]
        );

        let by_dtype = SortColumns::new(SortColumnsBy::Dtype)
            .descending(true)
            .transform(&x)
            .unwrap();
        assert_eq!(
            by_dtype.collect().unwrap().column_names(),
            &["s".to_string(), "b".to_string(), "a".to_string()]
        );

        let lazy = Frame::from(LazyFrame::new(sample()));
        assert!(matches!(
            SortColumns::default().transform(&lazy),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));
    }

    #[test]
    fn test_dummy_columns_replace_source_in_place() {
        let mut df = DataFrame::new();
        df.add_int_column("id", vec![1, 2, 3, 4]).unwrap();
        df.add_column(
            "color",
            StringColumn::from_options(vec![
                Some("red".into()),
                Some("blue".into()),
                None,
                Some("red".into()),
            ]),
        )
        .unwrap();
        df.add_float_column("w", vec![0.5, 0.5, 0.5, 0.5]).unwrap();
        let x = Frame::from(df);

        let out = Dummy::new()
            .with_columns("color")
            .transform(&x)
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(
            out.column_names(),
            &["id", "color_red", "color_blue", "color_null", "w"]
                .map(String::from)
        );
        assert_eq!(
            out.column("color_red").unwrap().as_int64().unwrap().to_options(),
            vec![Some(1), Some(0), Some(0), Some(1)]
        );
        assert_eq!(
            out.column("color_null").unwrap().as_int64().unwrap().to_options(),
            vec![Some(0), Some(0), Some(1), Some(0)]
        );

        let out = Dummy::new()
            .with_columns("color")
            .with_separator(":")
            .drop_first(true)
            .transform(&x)
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(
            out.column_names(),
            &["id", "color:blue", "color:null", "w"].map(String::from)
        );
        assert_eq!(out.row_count(), 4);
    }

    #[test]
    fn test_dummy_defaults_and_lazy_rejection() {
        let mut df = DataFrame::new();
        df.add_int_column("k", vec![2, 1, 2]).unwrap();
        df.add_boolean_column("f", vec![true, true, false]).unwrap();
        let out = Dummy::default()
            .transform(&Frame::from(df.clone()))
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(
            out.column_names(),
            &["k_2", "k_1", "f_true", "f_false"].map(String::from)
        );

        let lazy = Frame::from(LazyFrame::new(df));
        assert!(matches!(
            Dummy::new().transform(&lazy),
            Err(Error::LazyEvaluationUnsupported { .. })
        ));
    }

    #[test]
    fn test_cast() {
        let out = Cast::new()
            .column("a", ColumnType::Float64)
            .transform(&Frame::from(sample()))
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(out.column_type("a").unwrap(), ColumnType::Float64);
    }

    #[test]
    fn test_horizontal_ops_propagate_nulls() {
        let x = Frame::from(sample());
        let columns = vec!["a", "b"];

        let mean = Horizontal::new(HorizontalOp::Mean, columns.clone())
            .transform(&x)
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(
            mean.column("mean").unwrap().as_float64().unwrap().to_options(),
            vec![Some(2.0), Some(5.0), None]
        );

        let argmax = Horizontal::new(HorizontalOp::ArgMax, columns.clone())
            .with_name("best")
            .transform(&x)
            .unwrap()
            .collect()
            .unwrap();
        // ties resolve to the first column
        assert_eq!(
            argmax.column("best").unwrap().as_int64().unwrap().to_options(),
            vec![Some(0), Some(0), None]
        );

        let any = Horizontal::new(HorizontalOp::Any, columns)
            .transform(&x)
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(
            any.column("any").unwrap().as_boolean().unwrap().to_options(),
            vec![Some(true), Some(true), None]
        );
    }
}
