//! Core structure definition and basic functionality for DataFrame

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};

use crate::column::Column;
use crate::core::error::{Error, Result};

/// Materialized, column-oriented table
///
/// Columns are kept in insertion order and all share `row_count` rows.
#[derive(Clone)]
pub struct DataFrame {
    // Column data
    pub(crate) columns: Vec<Column>,
    // Column name → index mapping
    pub(crate) column_indices: HashMap<String, usize>,
    // Column order
    pub(crate) column_names: Vec<String>,
    // Row count
    pub(crate) row_count: usize,
}

impl Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

impl Debug for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Maximum display rows
        const MAX_ROWS: usize = 10;

        if self.columns.is_empty() {
            return write!(f, "DataFrame ({} rows x 0 columns)", self.row_count);
        }

        writeln!(
            f,
            "DataFrame ({} rows x {} columns):",
            self.row_count,
            self.columns.len()
        )?;

        write!(f, "{:<5} |", "idx")?;
        for name in &self.column_names {
            write!(f, " {:<15} |", name)?;
        }
        writeln!(f)?;

        write!(f, "{:-<5}-+", "")?;
        for _ in &self.column_names {
            write!(f, "-{:-<15}-+", "")?;
        }
        writeln!(f)?;

        let display_rows = std::cmp::min(self.row_count, MAX_ROWS);
        for i in 0..display_rows {
            write!(f, "{:<5} |", i)?;
            for col in &self.columns {
                let value = match col {
                    Column::Int64(col) => match col.get(i) {
                        Ok(Some(val)) => format!("{}", val),
                        _ => "NULL".to_string(),
                    },
                    Column::Float64(col) => match col.get(i) {
                        Ok(Some(val)) => format!("{:.3}", val),
                        _ => "NULL".to_string(),
                    },
                    Column::String(col) => match col.get(i) {
                        Ok(Some(val)) => format!("\"{}\"", val),
                        _ => "NULL".to_string(),
                    },
                    Column::Boolean(col) => match col.get(i) {
                        Ok(Some(val)) => format!("{}", val),
                        _ => "NULL".to_string(),
                    },
                };
                write!(f, " {:<15} |", value)?;
            }
            writeln!(f)?;
        }

        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }

        Ok(())
    }
}

impl Default for DataFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFrame {
    /// Create a new empty DataFrame
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            column_indices: HashMap::new(),
            column_names: Vec::new(),
            row_count: 0,
        }
    }

    /// Build a DataFrame from `(name, column)` pairs
    pub fn from_columns<N, C, I>(columns: I) -> Result<Self>
    where
        N: Into<String>,
        C: Into<Column>,
        I: IntoIterator<Item = (N, C)>,
    {
        let mut df = Self::new();
        for (name, column) in columns {
            df.add_column(name, column)?;
        }
        Ok(df)
    }

    /// Frame with a fixed row count and no columns yet
    pub(crate) fn with_row_count(row_count: usize) -> Self {
        Self {
            row_count,
            ..Self::new()
        }
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get column count
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get list of column names
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Check if specified column exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    /// Iterate over `(name, column)` pairs in column order
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// Column names as a sorted list, for order-insensitive schema checks
    pub fn sorted_column_names(&self) -> Vec<String> {
        let mut names = self.column_names.clone();
        names.sort();
        names
    }

    pub(crate) fn column_index(&self, name: &str) -> Result<usize> {
        self.column_indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }
}
