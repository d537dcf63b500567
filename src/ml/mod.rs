//! Machine Learning Module
//!
//! Fit/transform steps over [`Frame`](crate::frame::Frame)s, the [`Pipeline`]
//! that chains them, supervised model wrappers, cross-validation splitters and
//! the k-fold [`Stacker`] ensemble.

pub mod functional;
pub mod metrics;
pub mod model_selection;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod scope;
pub mod transformer;

// Re-export the step vocabulary
pub use functional::{
    Cast, DropColumns, DropNulls, Dummy, Horizontal, HorizontalOp, Select, SortColumns,
    SortColumnsBy,
};
pub use preprocessing::{
    Binarizer, ColumnSelector, LabelEncoder, LabelOrder, MinMaxScaler, RobustScaler,
    StandardScaler,
};

// Re-export models and ensembles
pub use models::{
    FitState, LinearRegression, LogisticRegression, NullPredictor, Predictor, Stacker,
};

pub use model_selection::{
    train_test_split, CrossValidator, Fold, GroupKFold, KFold, StratifiedKFold,
};
pub use metrics::{classification_metrics, regression_metrics, MetricsFn};

pub use pipeline::Pipeline;
pub use scope::DiagnosticScope;
pub use transformer::{ModelFactory, Transformer};
