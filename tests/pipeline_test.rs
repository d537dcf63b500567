//! Pipeline integration tests

use framepipe::column::{ColumnType, Int64Column};
use framepipe::config::FramepipeConfig;
use framepipe::ml::metrics::regression_metrics;
use framepipe::ml::models::{LinearRegression, LogisticRegression, METRICS_FILE};
use framepipe::ml::*;
use framepipe::{DataFrame, Error, Frame, LazyFrame};
use proptest::prelude::*;

fn housing() -> DataFrame {
    let mut df = DataFrame::new();
    df.add_float_column("rooms", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0])
        .unwrap();
    df.add_float_column("age", vec![5.0, 3.0, 8.0, 1.0, 9.0, 2.0, 7.0, 4.0, 6.0, 0.0])
        .unwrap();
    df.add_string_column(
        "city",
        ["a", "b", "a", "c", "b", "a", "c", "b", "a", "c"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
    .unwrap();
    df
}

fn price(df: &DataFrame) -> DataFrame {
    let rooms = df.column_to_array("rooms").unwrap();
    let age = df.column_to_array("age").unwrap();
    let y = rooms * 3.0 - age + 10.0;
    DataFrame::from_array("price", &y).unwrap()
}

#[test]
fn test_target_reaches_every_step() {
    let x = housing();
    let y = price(&x);

    let mut pipeline = Pipeline::new()
        .drop(vec!["city"], true)
        .standard_scale(vec!["rooms", "age"])
        .pipe(LinearRegression::new());
    let fitted = pipeline
        .fit_transform(&Frame::from(x.clone()), Some(&Frame::from(y.clone())))
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(fitted.column_names(), &["price".to_string()]);
    let predicted = fitted.column_to_array("price").unwrap();
    let expected = y.column_to_array("price").unwrap();
    for (p, e) in predicted.iter().zip(expected.iter()) {
        assert!((p - e).abs() < 1e-6);
    }
}

#[test]
fn test_diagnostics_layout() {
    let dir = tempfile::tempdir().unwrap();
    let x = housing();
    let y = price(&x);

    let stacker = Stacker::new(LinearRegression::new, KFold::new(5).with_shuffle(1))
        .with_metrics(regression_metrics());
    let mut pipeline = Pipeline::new()
        .with_diagnostics_root(dir.path())
        .select(vec!["rooms", "age"])
        .stack(stacker);
    pipeline
        .fit(&Frame::from(x.clone()), Some(&Frame::from(y)))
        .unwrap();

    let run = pipeline.last_run_scope().unwrap().path().to_path_buf();
    assert_eq!(run.parent(), Some(dir.path()));
    let metrics = run.join("1_Stacker").join(METRICS_FILE);
    assert!(metrics.is_file(), "missing {}", metrics.display());

    // every call mints a new run directory
    pipeline.transform(&Frame::from(x)).unwrap();
    let second = pipeline.last_run_scope().unwrap().path().to_path_buf();
    assert_ne!(run, second);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_from_config_without_root_writes_nothing() {
    let config = FramepipeConfig::default();
    let mut pipeline = Pipeline::from_config(&config).select(vec!["rooms"]);
    pipeline.fit(&Frame::from(housing()), None).unwrap();
    assert!(pipeline.last_run_scope().is_none());
}

#[test]
fn test_nested_pipeline_inherits_run_scope() {
    let dir = tempfile::tempdir().unwrap();
    let inner = Pipeline::new().min_max_scale("rooms");
    let mut outer = Pipeline::new()
        .with_diagnostics_root(dir.path())
        .pipe(inner)
        .select(vec!["rooms"]);
    outer.fit(&Frame::from(housing()), None).unwrap();
    assert_eq!(outer.step_names(), vec!["Pipeline", "Select"]);
    assert!(outer.last_run_scope().is_some());
}

#[test]
fn test_lazy_plan_through_stateless_steps() {
    let lazy = Frame::from(LazyFrame::new(housing()));
    let mut pipeline = Pipeline::new()
        .select(vec!["rooms", "age"])
        .horizontal(HorizontalOp::Sum, vec!["rooms", "age"], "total")
        .cast("total", ColumnType::Int64);

    let out = pipeline.fit_transform(&lazy, None).unwrap();
    assert!(out.is_lazy());
    let df = out.collect().unwrap();
    assert_eq!(
        df.column("total").unwrap().as_int64().unwrap().to_options()[..3],
        [Some(6), Some(5), Some(11)]
    );
}

#[test]
fn test_lazy_plan_rejected_by_stateful_step() {
    let lazy = Frame::from(LazyFrame::new(housing()));
    let mut pipeline = Pipeline::new().label_encode("city");
    assert!(matches!(
        pipeline.fit(&lazy, None),
        Err(Error::LazyEvaluationUnsupported { .. })
    ));
}

#[test]
fn test_impute_then_predict() {
    let mut df = housing();
    df.add_column(
        "floors",
        Int64Column::from_options(vec![
            Some(1),
            Some(2),
            None,
            Some(4),
            Some(5),
            None,
            Some(7),
            Some(8),
            Some(9),
            Some(10),
        ]),
    )
    .unwrap();
    let label: Vec<i64> = (0..10).map(|i| (i >= 5) as i64).collect();
    df.add_int_column("expensive", label).unwrap();

    let mut pipeline = Pipeline::new()
        .drop(vec!["city", "age"], true)
        .impute_nulls(LinearRegression::new(), "floors")
        .predict(
            LogisticRegression::new()
                .with_learning_rate(0.02)
                .with_max_iter(5000),
            vec!["expensive"],
        );
    let out = pipeline
        .fit_transform(&Frame::from(df), None)
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(out.column_names(), &["expensive".to_string()]);
    let probability = out.column_to_array("expensive").unwrap();
    assert!(probability[0] < 0.5);
    assert!(probability[9] > 0.5);
}

#[test]
fn test_dummy_then_model() {
    let x = housing();
    let y = price(&x);

    let mut pipeline = Pipeline::new()
        .dummy("city", true)
        .pipe(LinearRegression::new());
    let out = pipeline
        .fit_transform(&Frame::from(x.clone()), Some(&Frame::from(y)))
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(out.row_count(), 10);

    let mut encoder = Pipeline::new().dummy("city", false);
    let encoded = encoder
        .fit_transform(&Frame::from(x), None)
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(
        encoded.column_names(),
        &["rooms", "age", "city_a", "city_b", "city_c"].map(String::from)
    );
}

#[test]
fn test_sort_columns_by_dtype() {
    let mut pipeline = Pipeline::new().sort_columns(SortColumnsBy::Dtype, false);
    let out = pipeline
        .fit_transform(&Frame::from(housing()), None)
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(out.column_count(), 3);
    assert_eq!(out.column_names()[0..2], ["rooms".to_string(), "age".to_string()]);
}

fn permuted(df: &DataFrame, order: &[usize]) -> DataFrame {
    df.take_rows(order).unwrap()
}

proptest! {
    #[test]
    fn prop_row_wise_steps_commute_with_row_order(
        values in proptest::collection::vec(-1e3f64..1e3, 4..30),
        seed in any::<u64>(),
    ) {
        let n = values.len();
        prop_assume!(values.iter().any(|v| (v - values[0]).abs() > 1e-3));

        let mut df = DataFrame::new();
        df.add_float_column("v", values.clone()).unwrap();
        df.add_float_column("w", values.iter().map(|v| v * 0.5 + 1.0).collect()).unwrap();

        let mut order: Vec<usize> = (0..n).collect();
        order.rotate_left((seed % n as u64) as usize);

        let mut pipeline = Pipeline::new()
            .standard_scale("v")
            .horizontal(HorizontalOp::Max, vec!["v", "w"], "m");
        let straight = pipeline
            .fit_transform(&Frame::from(df.clone()), None)
            .unwrap()
            .collect()
            .unwrap();
        let shuffled = pipeline
            .transform(&Frame::from(permuted(&df, &order)))
            .unwrap()
            .collect()
            .unwrap();

        prop_assert_eq!(permuted(&straight, &order), shuffled);
    }
}
