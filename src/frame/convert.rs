//! Conversion between DataFrame and numeric arrays

use ndarray::{Array1, Array2};

use crate::column::{Column, Float64Column};
use crate::core::error::{Error, Result};
use crate::frame::core::DataFrame;

impl DataFrame {
    /// Dense `rows x columns` matrix of the named columns
    ///
    /// Integer and boolean columns are widened to `f64`. NULLs are rejected
    /// since numeric routines have no representation for them.
    pub fn to_ndarray<S: AsRef<str>>(&self, columns: &[S]) -> Result<Array2<f64>> {
        let mut matrix = Array2::<f64>::zeros((self.row_count, columns.len()));
        for (j, name) in columns.iter().enumerate() {
            let name = name.as_ref();
            let values = self.column(name)?.to_f64_options()?;
            for (i, value) in values.into_iter().enumerate() {
                matrix[[i, j]] = value.ok_or_else(|| {
                    Error::InvalidValue(format!("column {} has a NULL at row {}", name, i))
                })?;
            }
        }
        Ok(matrix)
    }

    /// Single column as a vector, with the same NULL policy as `to_ndarray`
    pub fn column_to_array(&self, name: &str) -> Result<Array1<f64>> {
        let matrix = self.to_ndarray(&[name])?;
        Ok(matrix.column(0).to_owned())
    }

    /// One-column frame holding `values`
    pub fn from_array(name: &str, values: &Array1<f64>) -> Result<Self> {
        DataFrame::from_columns([(
            name,
            Column::Float64(Float64Column::new(values.to_vec())),
        )])
    }
}
