use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::core::error::Result;
use crate::frame::core::DataFrame;

/// Deferred transformation of a whole frame
pub type FrameFn = Arc<dyn Fn(DataFrame) -> Result<DataFrame> + Send + Sync>;

/// DataFrame wrapper for lazy evaluation
///
/// Nothing runs until [`LazyFrame::collect`]; every builder call only appends
/// to the plan.
#[derive(Clone)]
pub struct LazyFrame {
    // Original DataFrame
    source: Arc<DataFrame>,
    // Queue of operations to apply
    operations: Vec<Operation>,
}

/// Operations for lazy evaluation
#[derive(Clone)]
pub enum Operation {
    /// Select columns
    Select(Vec<String>),
    /// Drop columns
    Drop { columns: Vec<String>, strict: bool },
    /// Keep rows where a boolean column is true
    Filter(String),
    /// Drop rows with NULLs in the subset (all columns when `None`)
    DropNulls(Option<Vec<String>>),
    /// Sort
    Sort {
        /// Column to sort by
        by: String,
        /// Whether to sort in ascending order
        ascending: bool,
    },
    /// Named whole-frame transformation
    Apply { name: String, f: FrameFn },
}

impl Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Select(columns) => write!(f, "Select({})", columns.join(", ")),
            Operation::Drop { columns, strict } => {
                write!(f, "Drop({}, strict={})", columns.join(", "), strict)
            }
            Operation::Filter(condition) => write!(f, "Filter({})", condition),
            Operation::DropNulls(subset) => match subset {
                Some(columns) => write!(f, "DropNulls({})", columns.join(", ")),
                None => write!(f, "DropNulls(*)"),
            },
            Operation::Sort { by, ascending } => {
                write!(f, "Sort({}, {})", by, if *ascending { "asc" } else { "desc" })
            }
            Operation::Apply { name, .. } => write!(f, "Apply({})", name),
        }
    }
}

impl Debug for LazyFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.explain())
    }
}

impl LazyFrame {
    /// Create a new LazyFrame
    pub fn new(df: DataFrame) -> Self {
        Self {
            source: Arc::new(df),
            operations: Vec::new(),
        }
    }

    /// Select columns
    pub fn select<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        let columns = columns.iter().map(|s| s.as_ref().to_string()).collect();
        self.operations.push(Operation::Select(columns));
        self
    }

    /// Drop columns
    pub fn drop<S: AsRef<str>>(mut self, columns: &[S], strict: bool) -> Self {
        let columns = columns.iter().map(|s| s.as_ref().to_string()).collect();
        self.operations.push(Operation::Drop { columns, strict });
        self
    }

    /// Filter data by a boolean column
    pub fn filter(mut self, condition: &str) -> Self {
        self.operations.push(Operation::Filter(condition.to_string()));
        self
    }

    /// Drop rows containing NULLs
    pub fn drop_nulls(mut self, subset: Option<Vec<String>>) -> Self {
        self.operations.push(Operation::DropNulls(subset));
        self
    }

    /// Sort data
    pub fn sort(mut self, by: &str, ascending: bool) -> Self {
        self.operations.push(Operation::Sort {
            by: by.to_string(),
            ascending,
        });
        self
    }

    /// Defer an arbitrary frame transformation
    pub fn apply<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(DataFrame) -> Result<DataFrame> + Send + Sync + 'static,
    {
        self.operations.push(Operation::Apply {
            name: name.into(),
            f: Arc::new(f),
        });
        self
    }

    /// Number of queued operations
    pub fn plan_len(&self) -> usize {
        self.operations.len()
    }

    /// Execute computation graph and get results
    pub fn collect(&self) -> Result<DataFrame> {
        let mut df = (*self.source).clone();

        for op in &self.operations {
            df = match op {
                Operation::Select(columns) => df.select_columns(columns.as_slice())?,
                Operation::Drop { columns, strict } => df.drop_columns(columns.as_slice(), *strict)?,
                Operation::Filter(condition) => df.filter_rows(condition)?,
                Operation::DropNulls(subset) => df.drop_nulls(subset.as_deref())?,
                Operation::Sort { by, ascending } => df.sort_by(by, *ascending)?,
                Operation::Apply { f, .. } => f(df)?,
            };
        }

        Ok(df)
    }

    /// Render the execution plan
    pub fn explain(&self) -> String {
        let mut result = String::new();
        result.push_str("LazyFrame execution plan:\n");
        result.push_str("----------------------\n");
        result.push_str(&format!(
            "SOURCE: DataFrame ({} rows x {} columns)\n",
            self.source.row_count(),
            self.source.column_count()
        ));

        for (i, op) in self.operations.iter().enumerate() {
            result.push_str(&format!("{}: {:?}\n", i + 1, op));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_int_column("id", vec![3, 1, 2]).unwrap();
        df.add_boolean_column("keep", vec![true, false, true]).unwrap();
        df
    }

    #[test]
    fn test_plan_is_deferred_until_collect() {
        let lazy = LazyFrame::new(sample())
            .filter("keep")
            .sort("id", true)
            .select(&["id"]);
        assert_eq!(lazy.plan_len(), 3);
        assert!(lazy.explain().contains("Filter(keep)"));

        let df = lazy.collect().unwrap();
        assert_eq!(df.column_names(), &["id".to_string()]);
        assert_eq!(
            df.column("id").unwrap().as_int64().unwrap().to_options(),
            vec![Some(2), Some(3)]
        );
    }

    #[test]
    fn test_errors_surface_on_collect() {
        let lazy = LazyFrame::new(sample()).drop(&["missing"], true);
        assert!(lazy.collect().is_err());
    }
}
