//! Row operations functionality for DataFrame

use super::core::DataFrame;
use crate::column::{Column, Int64Column};
use crate::core::error::{Error, Result};

impl DataFrame {
    /// Gather rows by position (as a new DataFrame)
    ///
    /// Positions may repeat and appear in any order; the output has one row per
    /// entry of `indices`.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.row_count) {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.row_count,
            });
        }

        let mut result = DataFrame::with_row_count(indices.len());
        for (name, column) in self.iter_columns() {
            result.add_column(name, column.take(indices)?)?;
        }
        Ok(result)
    }

    /// Keep the rows whose mask entry is `true`
    pub fn filter_by_mask(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: mask.len(),
            });
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take_rows(&indices)
    }

    /// Keep the rows where a boolean column is `true`; NULL counts as `false`
    pub fn filter_rows(&self, condition_column: &str) -> Result<Self> {
        let column = self.column(condition_column)?;
        let flags = column.as_boolean().ok_or_else(|| Error::ColumnTypeMismatch {
            name: condition_column.to_string(),
            expected: crate::column::ColumnType::Boolean,
            found: column.column_type(),
        })?;
        let mask: Vec<bool> = flags
            .to_options()
            .into_iter()
            .map(|v| v == Some(true))
            .collect();
        self.filter_by_mask(&mask)
    }

    /// Per-row flag: is any of `subset` (all columns when `None`) NULL
    pub fn null_rows<S: AsRef<str>>(&self, subset: Option<&[S]>) -> Result<Vec<bool>> {
        let columns: Vec<&Column> = match subset {
            Some(names) => names
                .iter()
                .map(|n| self.column(n.as_ref()))
                .collect::<Result<_>>()?,
            None => self.columns.iter().collect(),
        };

        Ok((0..self.row_count)
            .map(|i| columns.iter().any(|c| c.is_null(i)))
            .collect())
    }

    /// Drop rows containing NULLs in `subset` (all columns when `None`)
    pub fn drop_nulls<S: AsRef<str>>(&self, subset: Option<&[S]>) -> Result<Self> {
        let keep: Vec<bool> = self.null_rows(subset)?.into_iter().map(|n| !n).collect();
        self.filter_by_mask(&keep)
    }

    /// Prepend a 0-based `Int64` row index column
    pub fn with_row_index(&self, name: &str) -> Result<Self> {
        let index = Int64Column::new((0..self.row_count as i64).collect());
        let mut df = DataFrame::with_row_count(self.row_count);
        df.add_column(name, index)?;
        for (col_name, column) in self.iter_columns() {
            df.add_column(col_name, column.clone())?;
        }
        Ok(df)
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Result<Self> {
        let indices: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&indices)
    }

    /// Stack frames on top of each other
    ///
    /// Every frame must carry the same set of columns with the same types; the
    /// column order of the first frame wins.
    pub fn vstack(frames: &[&DataFrame]) -> Result<Self> {
        let first = match frames.first() {
            Some(first) => first,
            None => return Ok(DataFrame::new()),
        };

        let expected = first.sorted_column_names();
        for frame in frames.iter().skip(1) {
            let found = frame.sorted_column_names();
            if found != expected {
                return Err(Error::ColumnsMismatch {
                    step: "vstack".to_string(),
                    expected,
                    found,
                });
            }
        }

        let total_rows = frames.iter().map(|f| f.row_count).sum();
        let mut result = DataFrame::with_row_count(total_rows);
        for name in first.column_names() {
            let parts: Vec<&Column> = frames
                .iter()
                .map(|f| f.column(name))
                .collect::<Result<_>>()?;
            result.add_column(name.clone(), Column::concat(&parts)?)?;
        }
        Ok(result)
    }
}
