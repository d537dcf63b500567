//! framepipe: composable fit/transform pipelines over a typed column store
//!
//! Frames are either eager [`DataFrame`]s or deferred [`LazyFrame`] plans.
//! Steps implement [`Transformer`] and are chained with [`Pipeline`];
//! [`Stacker`] fits one model per cross-validation fold and combines them.

// Core error definitions
pub mod core;

// Typed columns and the DataFrame built on them
pub mod column;
pub mod frame;

// Configuration and logging
pub mod config;
pub mod logging;

// Pipelines, models and ensembles
pub mod ml;

// Re-export commonly used types
pub use column::{
    BooleanColumn, Column, ColumnTrait, ColumnType, Float64Column, Int64Column, StringColumn,
};
pub use config::FramepipeConfig;
pub use crate::core::error::{Error, Result};
pub use frame::{AggregateOp, DataFrame, Frame, LazyFrame, RowIndex};
pub use logging::init_logging;
pub use ml::{
    CrossValidator, DiagnosticScope, GroupKFold, KFold, ModelFactory, NullPredictor, Pipeline,
    Predictor, Stacker, StratifiedKFold, Transformer,
};
