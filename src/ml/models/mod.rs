//! Machine learning models
//!
//! Model adapters that turn frames into numeric arrays, plus the composite
//! steps that wrap them: target splitting, null imputation and k-fold
//! stacking.

pub mod linear;
pub mod null_predictor;
pub mod predictor;
pub mod stacker;

pub use linear::{LinearRegression, LogisticRegression};
pub use null_predictor::NullPredictor;
pub use predictor::Predictor;
pub use stacker::{FitState, Stacker, METRICS_FILE};
