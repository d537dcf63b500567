//! Linear models for regression and classification
//!
//! Both adapters turn the feature frame into an `ndarray` matrix, remember the
//! feature names they were fitted on, and emit a single `Float64` column named
//! after the target.

use std::collections::HashSet;

use ndarray::{Array1, Array2, Axis};

use crate::core::error::{Error, Result};
use crate::frame::{DataFrame, Frame};
use crate::ml::scope::DiagnosticScope;
use crate::ml::transformer::Transformer;

/// Column names seen at fit time
#[derive(Debug, Clone)]
struct FeatureSchema {
    features: Vec<String>,
    target: String,
}

impl FeatureSchema {
    /// Read the schema from a training pair, requiring exactly one target column
    fn from_training(step: &str, x: &DataFrame, y: &DataFrame) -> Result<Self> {
        if y.column_count() != 1 {
            return Err(Error::InvalidConfig(format!(
                "{} expects exactly one target column, got {}",
                step,
                y.column_count()
            )));
        }
        if x.row_count() != y.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: x.row_count(),
                found: y.row_count(),
            });
        }
        if x.column_count() == 0 {
            return Err(Error::InvalidInput(format!("{} has no feature columns", step)));
        }
        Ok(FeatureSchema {
            features: x.column_names().to_vec(),
            target: y.column_names()[0].clone(),
        })
    }

    /// Feature matrix in fitted column order
    ///
    /// Column order may differ from fit time, the set of names may not.
    fn design(&self, step: &str, x: &DataFrame) -> Result<Array2<f64>> {
        let expected: HashSet<&str> = self.features.iter().map(String::as_str).collect();
        let found: HashSet<&str> = x.column_names().iter().map(String::as_str).collect();
        if expected != found {
            return Err(Error::ColumnsMismatch {
                step: step.to_string(),
                expected: self.features.clone(),
                found: x.column_names().to_vec(),
            });
        }
        x.to_ndarray(self.features.as_slice())
    }
}

fn training_pair<'a>(step: &str, x: &'a Frame, y: Option<&'a Frame>) -> Result<(&'a DataFrame, &'a DataFrame)> {
    let x = x.require_eager(step, "fit")?;
    let y = y
        .ok_or_else(|| Error::TargetRequired(step.to_string()))?
        .require_eager(step, "fit")?;
    Ok((x, y))
}

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting
fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let n = matrix.nrows();
    if n == 0 || matrix.ncols() != n {
        return Err(Error::Computation("Matrix must be square and non-empty".into()));
    }

    // Augmented matrix [A|I]
    let mut augmented = Array2::<f64>::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            augmented[[i, j]] = matrix[[i, j]];
        }
        augmented[[i, n + i]] = 1.0;
    }

    for i in 0..n {
        let mut max_row = i;
        let mut max_val = augmented[[i, i]].abs();
        for j in i + 1..n {
            let abs_val = augmented[[j, i]].abs();
            if abs_val > max_val {
                max_row = j;
                max_val = abs_val;
            }
        }

        if max_val < 1e-10 {
            return Err(Error::Computation(
                "Matrix is singular (inverse does not exist)".into(),
            ));
        }

        if max_row != i {
            for k in 0..2 * n {
                augmented.swap([i, k], [max_row, k]);
            }
        }

        let pivot = augmented[[i, i]];
        for k in 0..2 * n {
            augmented[[i, k]] /= pivot;
        }

        for j in 0..n {
            if j != i {
                let factor = augmented[[j, i]];
                for k in 0..2 * n {
                    augmented[[j, k]] -= factor * augmented[[i, k]];
                }
            }
        }
    }

    Ok(augmented.slice(ndarray::s![.., n..]).to_owned())
}

fn prediction_frame(target: &str, values: &Array1<f64>) -> Result<DataFrame> {
    DataFrame::from_array(target, values)
}

#[derive(Debug, Clone)]
struct LinearFit {
    schema: FeatureSchema,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearFit {
    fn predict(&self, step: &str, x: &DataFrame) -> Result<DataFrame> {
        let design = self.schema.design(step, x)?;
        let values = design.dot(&self.coefficients) + self.intercept;
        prediction_frame(&self.schema.target, &values)
    }
}

/// Linear regression model
///
/// Implements ordinary least squares via the normal equations.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Whether to fit the intercept
    fit_intercept: bool,
    fitted: Option<LinearFit>,
    scope: Option<DiagnosticScope>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create a new LinearRegression model
    pub fn new() -> Self {
        LinearRegression {
            fit_intercept: true,
            fitted: None,
            scope: None,
        }
    }

    /// Set whether to fit the intercept
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fitted coefficients in feature order
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.coefficients)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }
}

impl Transformer for LinearRegression {
    fn name(&self) -> &str {
        "LinearRegression"
    }

    fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        self.fitted = None;
        let (x, y) = training_pair(self.name(), x, y)?;
        let schema = FeatureSchema::from_training(self.name(), x, y)?;

        let features = x.to_ndarray(schema.features.as_slice())?;
        let target = y.column_to_array(&schema.target)?;
        let n = features.nrows();
        if n == 0 {
            return Err(Error::InvalidInput("No data to train on".into()));
        }

        // Solve normal equation: β = (X'X)⁻¹X'y
        let design = if self.fit_intercept {
            let ones = Array2::<f64>::ones((n, 1));
            ndarray::concatenate(Axis(1), &[ones.view(), features.view()])
                .map_err(|e| Error::Computation(e.to_string()))?
        } else {
            features
        };
        let xt = design.t();
        let beta = invert(&xt.dot(&design))?.dot(&xt.dot(&target));

        let (intercept, coefficients) = if self.fit_intercept {
            (beta[0], beta.slice(ndarray::s![1..]).to_owned())
        } else {
            (0.0, beta)
        };

        tracing::debug!(
            features = schema.features.len(),
            rows = n,
            intercept,
            "linear regression fitted"
        );
        self.fitted = Some(LinearFit {
            schema,
            coefficients,
            intercept,
        });
        Ok(())
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let fitted = self
            .fitted
            .clone()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        x.map_frame(self.name(), move |df| fitted.predict("LinearRegression", &df))
    }

    fn scope(&self) -> Option<&DiagnosticScope> {
        self.scope.as_ref()
    }

    fn set_scope(&mut self, scope: Option<DiagnosticScope>) {
        self.scope = scope;
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone)]
struct LogisticFit {
    schema: FeatureSchema,
    weights: Array1<f64>,
    bias: f64,
}

impl LogisticFit {
    fn predict(&self, step: &str, x: &DataFrame) -> Result<DataFrame> {
        let design = self.schema.design(step, x)?;
        let values = (design.dot(&self.weights) + self.bias).mapv(sigmoid);
        prediction_frame(&self.schema.target, &values)
    }
}

/// Logistic regression model for binary classification
///
/// Fitted by batch gradient descent from all-zero weights, so results are
/// deterministic. The output column holds P(class = 1); any non-zero target
/// counts as the positive class.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    /// L2 penalty on the weights (not the bias)
    l2: f64,
    fitted: Option<LogisticFit>,
    scope: Option<DiagnosticScope>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new LogisticRegression model with default parameters
    pub fn new() -> Self {
        LogisticRegression {
            learning_rate: 0.1,
            max_iter: 500,
            l2: 0.0,
            fitted: None,
            scope: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set maximum number of iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set regularization strength
    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.weights)
    }
}

impl Transformer for LogisticRegression {
    fn name(&self) -> &str {
        "LogisticRegression"
    }

    fn fit(&mut self, x: &Frame, y: Option<&Frame>) -> Result<()> {
        self.fitted = None;
        if !(self.learning_rate > 0.0) || self.l2 < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be positive and l2 non-negative ({}, {})",
                self.learning_rate, self.l2
            )));
        }
        let (x, y) = training_pair(self.name(), x, y)?;
        let schema = FeatureSchema::from_training(self.name(), x, y)?;

        let features = x.to_ndarray(schema.features.as_slice())?;
        let target = y
            .column_to_array(&schema.target)?
            .mapv(|v| if v != 0.0 { 1.0 } else { 0.0 });
        let n = features.nrows();
        if n == 0 {
            return Err(Error::InvalidInput("No data to train on".into()));
        }

        let mut weights = Array1::<f64>::zeros(features.ncols());
        let mut bias = 0.0;
        for _ in 0..self.max_iter {
            let residual = (features.dot(&weights) + bias).mapv(sigmoid) - &target;
            let grad_w = features.t().dot(&residual) / n as f64 + &weights * self.l2;
            let grad_b = residual.sum() / n as f64;
            weights = weights - grad_w * self.learning_rate;
            bias -= grad_b * self.learning_rate;
        }

        tracing::debug!(
            features = schema.features.len(),
            rows = n,
            iterations = self.max_iter,
            "logistic regression fitted"
        );
        self.fitted = Some(LogisticFit {
            schema,
            weights,
            bias,
        });
        Ok(())
    }

    fn transform(&mut self, x: &Frame) -> Result<Frame> {
        let fitted = self
            .fitted
            .clone()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        x.map_frame(self.name(), move |df| fitted.predict("LogisticRegression", &df))
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
    use approx::assert_abs_diff_eq;

    fn line() -> (Frame, Frame) {
        let mut x = DataFrame::new();
        x.add_float_column("a", vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        x.add_float_column("b", vec![1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
        let mut y = DataFrame::new();
        // y = 2a - 3b + 1
        y.add_float_column("y", vec![-2.0, 3.0, 2.0, 7.0, 6.0]).unwrap();
        (Frame::from(x), Frame::from(y))
    }

    #[test]
    fn test_linear_regression_recovers_coefficients() {
        let (x, y) = line();
        let mut model = LinearRegression::new();
        model.fit(&x, Some(&y)).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert_abs_diff_eq!(coefficients[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coefficients[1], -3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.intercept().unwrap(), 1.0, epsilon = 1e-9);

        let out = model.transform(&x).unwrap().collect().unwrap();
        assert_eq!(out.column_names(), &["y".to_string()]);
    }

    #[test]
    fn test_column_order_may_change_but_not_the_set() {
        let (x, y) = line();
        let mut model = LinearRegression::new();
        model.fit(&x, Some(&y)).unwrap();

        let reordered = x.collect().unwrap().select_columns(&["b", "a"]).unwrap();
        let pred = model.transform(&Frame::from(reordered)).unwrap().collect().unwrap();
        assert_abs_diff_eq!(
            pred.column_to_array("y").unwrap()[1],
            3.0,
            epsilon = 1e-9
        );

        let mut extra = x.collect().unwrap();
        extra.add_float_column("c", vec![0.0; 5]).unwrap();
        assert!(matches!(
            model.transform(&Frame::from(extra)),
            Err(Error::ColumnsMismatch { .. })
        ));
    }

    #[test]
    fn test_target_requirements() {
        let (x, _) = line();
        let mut model = LinearRegression::new();
        assert!(matches!(model.fit(&x, None), Err(Error::TargetRequired(_))));
        assert!(matches!(model.transform(&x), Err(Error::NotFitted(_))));

        let two = x.collect().unwrap();
        assert!(matches!(
            model.fit(&x, Some(&Frame::from(two))),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_logistic_regression_separates_classes() {
        let mut x = DataFrame::new();
        x.add_float_column("a", vec![-2.0, -1.5, -1.0, 1.0, 1.5, 2.0]).unwrap();
        let mut y = DataFrame::new();
        y.add_int_column("label", vec![0, 0, 0, 1, 1, 1]).unwrap();
        let x = Frame::from(x);

        let mut model = LogisticRegression::new();
        model.fit(&x, Some(&Frame::from(y))).unwrap();
        let prob = model
            .transform(&x)
            .unwrap()
            .collect()
            .unwrap()
            .column_to_array("label")
            .unwrap();
        assert!(prob[0] < 0.5 && prob[5] > 0.5);
        assert!(prob.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}
