//! Column operation features for DataFrame

use super::core::DataFrame;
use crate::column::{BooleanColumn, Column, ColumnType, Float64Column, Int64Column, StringColumn};
use crate::core::error::{Error, Result};

impl DataFrame {
    /// Add a column
    pub fn add_column<C: Into<Column>>(
        &mut self,
        name: impl Into<String>,
        column: C,
    ) -> Result<()> {
        let name = name.into();
        let column = column.into();

        // Check for duplicate column names
        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }

        // Check row count consistency
        let column_len = column.len();
        if !self.columns.is_empty() && column_len != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column_len,
            });
        }

        let column_idx = self.columns.len();
        self.columns.push(column.renamed(name.clone()));
        self.column_indices.insert(name.clone(), column_idx);
        self.column_names.push(name);

        if self.columns.len() == 1 {
            self.row_count = column_len;
        }

        Ok(())
    }

    /// Add an integer column
    pub fn add_int_column(&mut self, name: impl Into<String>, data: Vec<i64>) -> Result<()> {
        self.add_column(name, Column::Int64(Int64Column::new(data)))
    }

    /// Add a float column
    pub fn add_float_column(&mut self, name: impl Into<String>, data: Vec<f64>) -> Result<()> {
        self.add_column(name, Column::Float64(Float64Column::new(data)))
    }

    /// Add a string column
    pub fn add_string_column(&mut self, name: impl Into<String>, data: Vec<String>) -> Result<()> {
        self.add_column(name, Column::String(StringColumn::new(data)))
    }

    /// Add a boolean column
    pub fn add_boolean_column(&mut self, name: impl Into<String>, data: Vec<bool>) -> Result<()> {
        self.add_column(name, Column::Boolean(BooleanColumn::new(data)))
    }

    /// Replace a column in place, or append it when the name is new
    pub fn with_column<C: Into<Column>>(&mut self, name: impl Into<String>, column: C) -> Result<()> {
        let name = name.into();
        let column = column.into();

        match self.column_indices.get(&name) {
            Some(&idx) => {
                if column.len() != self.row_count {
                    return Err(Error::InconsistentRowCount {
                        expected: self.row_count,
                        found: column.len(),
                    });
                }
                self.columns[idx] = column.renamed(name);
                Ok(())
            }
            None => self.add_column(name, column),
        }
    }

    /// Remove a column
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let column_idx = self.column_index(name)?;

        let removed_column = self.columns.remove(column_idx);
        self.column_indices.remove(name);
        self.column_names.remove(column_idx);

        // Recalculate indices
        for idx in self.column_indices.values_mut() {
            if *idx > column_idx {
                *idx -= 1;
            }
        }

        Ok(removed_column)
    }

    /// Rename a column
    pub fn rename_column(&mut self, old_name: &str, new_name: impl Into<String>) -> Result<()> {
        let new_name = new_name.into();

        if self.column_indices.contains_key(&new_name) && old_name != new_name {
            return Err(Error::DuplicateColumnName(new_name));
        }

        let column_idx = self.column_index(old_name)?;

        self.column_indices.remove(old_name);
        self.column_indices.insert(new_name.clone(), column_idx);
        self.columns[column_idx] = self.columns[column_idx].renamed(new_name.clone());
        self.column_names[column_idx] = new_name;

        Ok(())
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        let idx = self.column_index(name)?;
        Ok(&self.columns[idx])
    }

    /// Get the type of a column
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.column(name)?.column_type())
    }

    /// Project onto the named columns, in the order given
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut df = DataFrame::with_row_count(self.row_count);
        for name in names {
            let name = name.as_ref();
            df.add_column(name, self.column(name)?.clone())?;
        }
        Ok(df)
    }

    /// Drop the named columns
    ///
    /// With `strict`, every name must exist; otherwise missing names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S], strict: bool) -> Result<Self> {
        let mut df = self.clone();
        for name in names {
            let name = name.as_ref();
            if df.contains_column(name) {
                df.remove_column(name)?;
            } else if strict {
                return Err(Error::ColumnNotFound(name.to_string()));
            }
        }
        Ok(df)
    }

    /// Names of floating point columns
    pub fn numerical_columns(&self) -> Vec<String> {
        self.columns_of_types(&[ColumnType::Float64])
    }

    /// Names of categorical columns (strings and booleans)
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of_types(&[ColumnType::String, ColumnType::Boolean])
    }

    /// Names of columns whose type is one of `types`
    pub fn columns_of_types(&self, types: &[ColumnType]) -> Vec<String> {
        self.iter_columns()
            .filter(|(_, col)| types.contains(&col.column_type()))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Place the columns of `frames` side by side
    pub fn hstack(frames: &[&DataFrame]) -> Result<Self> {
        let mut df = DataFrame::new();
        if let Some(first) = frames.first() {
            df.row_count = first.row_count;
        }
        for frame in frames {
            if frame.row_count != df.row_count {
                return Err(Error::InconsistentRowCount {
                    expected: df.row_count,
                    found: frame.row_count,
                });
            }
            for (name, column) in frame.iter_columns() {
                df.add_column(name, column.clone())?;
            }
        }
        Ok(df)
    }
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        if self.row_count != other.row_count || self.column_names != other.column_names {
            return false;
        }
        self.columns
            .iter()
            .zip(other.columns.iter())
            .all(|(a, b)| match (a, b) {
                (Column::Int64(a), Column::Int64(b)) => a.to_options() == b.to_options(),
                (Column::Float64(a), Column::Float64(b)) => {
                    let (a, b) = (a.to_options(), b.to_options());
                    a.iter().zip(b.iter()).all(|(x, y)| match (x, y) {
                        (Some(x), Some(y)) => x.to_bits() == y.to_bits(),
                        (None, None) => true,
                        _ => false,
                    })
                }
                (Column::String(a), Column::String(b)) => a.to_options() == b.to_options(),
                (Column::Boolean(a), Column::Boolean(b)) => a.to_options() == b.to_options(),
                _ => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_int_column("id", vec![1, 2, 3]).unwrap();
        df.add_float_column("value", vec![0.5, 1.5, 2.5]).unwrap();
        df.add_string_column("name", vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        df
    }

    #[test]
    fn test_add_column_checks() {
        let mut df = sample();
        assert!(matches!(
            df.add_int_column("id", vec![1, 2, 3]),
            Err(Error::DuplicateColumnName(_))
        ));
        assert!(matches!(
            df.add_int_column("short", vec![1]),
            Err(Error::InconsistentRowCount {
                expected: 3,
                found: 1
            })
        ));
    }

    #[test]
    fn test_remove_and_rename_keep_indices() {
        let mut df = sample();
        df.remove_column("id").unwrap();
        assert_eq!(df.column_names(), &["value".to_string(), "name".to_string()]);
        assert_eq!(df.column_type("name").unwrap(), ColumnType::String);

        df.rename_column("value", "score").unwrap();
        assert!(df.contains_column("score"));
        assert_eq!(df.column("score").unwrap().name(), Some("score"));
    }

    #[test]
    fn test_select_and_drop() {
        let df = sample();
        let selected = df.select_columns(&["name", "id"]).unwrap();
        assert_eq!(selected.column_names(), &["name".to_string(), "id".to_string()]);

        assert!(df.drop_columns(&["missing"], true).is_err());
        let dropped = df.drop_columns(&["missing", "id"], false).unwrap();
        assert_eq!(dropped.column_count(), 2);
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let mut df = sample();
        df.with_column("id", Float64Column::new(vec![9.0, 8.0, 7.0]))
            .unwrap();
        assert_eq!(df.column_names()[0], "id");
        assert_eq!(df.column_type("id").unwrap(), ColumnType::Float64);
    }

    #[test]
    fn test_kind_helpers() {
        let mut df = sample();
        df.add_boolean_column("flag", vec![true, false, true]).unwrap();
        assert_eq!(df.numerical_columns(), vec!["value".to_string()]);
        assert_eq!(
            df.categorical_columns(),
            vec!["name".to_string(), "flag".to_string()]
        );
    }
}
